// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod creds;
mod display;
mod machine;
mod orchestrator;
mod probe;
mod registry;
mod render;
mod settings;
mod state;
mod theme;

use probe::{HttpProber, Prober};
use registry::{Target, Tier};
use render::Renderer;
use settings::Settings;
use state::PanelState;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "pulseboard", version)]
#[command(about = "Live status table probing relay endpoint liveness and latency")]
struct Args {
    /// Probe only relays in the given tier (repeatable)
    #[arg(long = "tier", value_enum)]
    tiers: Vec<Tier>,

    /// Path to an alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Discard the stored API key and prompt for a new one
    #[arg(long)]
    reset_key: bool,
}

/// How a run ended.
enum Completion {
    Finished,
    Interrupted,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(Completion::Finished) => ExitCode::SUCCESS,
        Ok(Completion::Interrupted) => ExitCode::from(130),
        Err(err) => {
            eprintln!("pulseboard: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<Completion> {
    // Input validation happens before any probing: a bad selection or a
    // missing key must fail without touching the network or the terminal.
    let settings = Settings::load(args.config.as_deref())?;
    let credential = creds::resolve_api_key(args.reset_key)?;

    let targets = registry::filter_by_tiers(registry::builtin(), &args.tiers);
    if targets.is_empty() {
        bail!("no relays match the selected tiers");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_probes(settings, credential, targets))
}

async fn run_probes(
    settings: Settings,
    credential: String,
    targets: Vec<Target>,
) -> Result<Completion> {
    let panel = Arc::new(PanelState::new(targets));
    let prober: Arc<dyn Prober> = Arc::new(HttpProber::new(&settings, &credential)?);
    let renderer = Renderer::new(Theme::auto_detect(), settings.slow_threshold_ms);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    display::install_panic_hook();

    let mut work = tokio::spawn(orchestrator::run(
        Arc::clone(&panel),
        prober,
        settings.max_attempts,
    ));

    let live =
        display::run_live(&panel, &renderer, settings.frame_interval(), &mut work, &cancel).await?;
    if live.interrupted {
        // abandon in-flight probes; their results are no longer awaited
        work.abort();
    }

    // Exactly one final snapshot goes to normal scrollback output.
    println!("{}", renderer.render(&panel.snapshot(live.last_tick)));

    Ok(if live.interrupted {
        Completion::Interrupted
    } else {
        Completion::Finished
    })
}
