//! podsctl - inspect compose file resolution for beamline pods
//!
//! Lists services, shows the compose chain a service would be started with,
//! and prints the environment podman-compose needs. Starting and stopping
//! containers is left to podman-compose itself.

mod display_cmd;
mod errors;
mod list;
mod resolve;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pods_common::{PodsConfig, PodsError, RealFs, UiSettings};
use tracing_subscriber::{fmt, EnvFilter};

use ui::{detect_style, Style};

#[derive(Parser)]
#[command(name = "podsctl", version, about = "NBS Pods - compose file resolution")]
struct Cli {
    /// Log every probed compose file
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List available services
    List,
    /// Show the compose chain for one service
    Resolve {
        service: String,
        /// Include the development layer
        #[arg(long)]
        dev: bool,
    },
    /// Show the chains services would be started with
    Plan {
        /// Services to plan (all services when none are given)
        services: Vec<String>,
        /// Services to plan in development mode
        #[arg(long, num_args = 0..)]
        dev: Vec<String>,
        /// Plan the demo service set
        #[arg(long, conflicts_with_all = ["services", "dev"])]
        demo: bool,
    },
    /// Print the podman-compose environment for a service
    Env {
        service: String,
        #[arg(long)]
        dev: bool,
    },
    /// Show the detected display protocol
    Display,
}

pub struct Ctx {
    pub cfg: PodsConfig,
    pub fs: RealFs,
    pub style: Style,
    pub json: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pods_common=debug,podsctl=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

impl Ctx {
    fn new(cfg: PodsConfig, json: bool) -> Self {
        let style = detect_style(&cfg.ui);
        Self {
            cfg,
            fs: RealFs,
            style,
            json,
        }
    }
}

fn run(ctx: &Ctx, cmd: Cmd) -> Result<()> {
    match cmd {
        Cmd::List => list::run(ctx),
        Cmd::Resolve { service, dev } => resolve::run_resolve(ctx, &service, dev),
        Cmd::Plan {
            services,
            dev,
            demo,
        } => resolve::run_plan(ctx, &services, &dev, demo),
        Cmd::Env { service, dev } => resolve::run_env(ctx, &service, dev),
        Cmd::Display => display_cmd::run(ctx),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // replaced by the configured style once the config has loaded
    let mut style = detect_style(&UiSettings::default());
    let result = PodsConfig::from_env()
        .map_err(anyhow::Error::from)
        .and_then(|cfg| {
            let ctx = Ctx::new(cfg, cli.json);
            style = ctx.style;
            run(&ctx, cli.cmd)
        });

    if let Err(err) = result {
        eprintln!("{}", ui::err(&style, &format!("Error: {:#}", err)));
        if let Some(PodsError::UnknownService { available, .. }) = err.downcast_ref::<PodsError>() {
            eprintln!("{}", list::render_available(&style, available));
        }
        std::process::exit(errors::exit_code(&err));
    }
}
