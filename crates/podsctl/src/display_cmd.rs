use crate::ui;
use crate::Ctx;
use anyhow::Result;
use pods_common::{DetectionSource, DisplayProtocolDetector};

pub fn run(ctx: &Ctx) -> Result<()> {
    let detection = DisplayProtocolDetector::new(&ctx.cfg, &ctx.fs).detection();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
        return Ok(());
    }

    let reason = match &detection.source {
        DetectionSource::Override => "DISPLAY_PROTOCOL override".to_string(),
        DetectionSource::WaylandSocket { socket } => format!("live socket {}", socket.display()),
        DetectionSource::X11Socket { socket } => format!("live socket {}", socket.display()),
        DetectionSource::Fallback => "no live display socket, default".to_string(),
    };
    println!("{}", ui::kv(&ctx.style, "Display protocol", detection.protocol.as_str()));
    println!("{}", ui::kv(&ctx.style, "Source", &reason));
    Ok(())
}
