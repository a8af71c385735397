use crate::ui::{self, Style};
use crate::Ctx;
use anyhow::Result;
use pods_common::{beamline_name, PathRoots, ServiceDiscovery};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Serialize)]
struct ListOut<'a> {
    beamline: String,
    demo: bool,
    package_root: String,
    site_root: String,
    base: &'a BTreeSet<String>,
    beamline_services: &'a BTreeSet<String>,
}

pub fn run(ctx: &Ctx) -> Result<()> {
    let roots = PathRoots::from_config(&ctx.cfg);
    let catalog = ServiceDiscovery::with_roots(roots.clone(), &ctx.fs).catalog();
    let beamline = beamline_name(&ctx.cfg, &roots);

    if ctx.json {
        let out = ListOut {
            beamline,
            demo: roots.is_demo(),
            package_root: roots.package_root().display().to_string(),
            site_root: roots.site_root().display().to_string(),
            base: &catalog.base,
            beamline_services: &catalog.beamline,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let style = &ctx.style;
    let mode = if roots.is_demo() { " (demo mode)" } else { "" };
    println!("{}", ui::kv(style, "Beamline", &format!("{}{}", beamline, mode)));
    println!("{}", ui::head(style, "Available services:"));
    println!("Base services (can be overridden):");
    for service in &catalog.base {
        println!("{}", ui::bullet(style, service));
    }
    if !catalog.beamline.is_empty() {
        println!("Beamline services:");
        for service in &catalog.beamline {
            println!("{}", ui::bullet(style, service));
        }
    }
    Ok(())
}

pub fn render_available(style: &Style, available: &[String]) -> String {
    let mut out = String::from("Available services:");
    for service in available {
        out.push('\n');
        out.push_str(&ui::bullet(style, service));
    }
    out
}
