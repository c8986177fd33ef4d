//! Mindstream — experiential loop over a local language model
//!
//! Usage:
//!   mindstream --config mindstream.toml
//!
//! Repeatedly samples machine/environment sensors, feeds the rolling
//! context to a local model, occasionally surfaces a generated thought to
//! the terminal, and logs every step to a session JSONL file. One Ctrl-C
//! drains and stops; a second one terminates immediately.

use clap::Parser;
use mindstream::config::MindstreamConfig;
use mindstream::display::DisplayLoop;
use mindstream::logger::SessionLogger;
use mindstream::sensors::SensorArray;
use mindstream::session::{DisplayState, Worker};
use mindstream::shutdown;
use mindstream_llm::{CompletionEngine, OllamaEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "mindstream",
    about = "Sense-think-decide-log loop over a local language model"
)]
struct Cli {
    /// Path to config file (TOML). Default: ./mindstream.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the model name.
    #[arg(long)]
    model: Option<String>,

    /// Override the surfacing probability.
    #[arg(long)]
    probability: Option<f64>,

    /// Fix the decision gate seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the session log directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Dump default config as TOML and exit.
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.dump_config {
        println!("{}", MindstreamConfig::default().to_toml());
        return Ok(());
    }

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from("mindstream.toml"));
    let mut config = MindstreamConfig::load(&config_path);
    if let Some(model) = cli.model {
        config.model.name = model;
    }
    if let Some(p) = cli.probability {
        config.cycle.communication_probability = p;
    }
    if cli.seed.is_some() {
        config.cycle.seed = cli.seed;
    }
    if let Some(dir) = cli.log_dir {
        config.logging.dir = dir.display().to_string();
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    println!("╔══════════════════════════════════════════════════╗");
    println!("║  MINDSTREAM v{}                                ║", env!("CARGO_PKG_VERSION"));
    println!("║  sense → think → decide → log                    ║");
    println!("╚══════════════════════════════════════════════════╝");

    let engine: Arc<dyn CompletionEngine> = Arc::new(
        OllamaEngine::new(config.model.name.clone())
            .with_base_url(config.model.base_url.clone())
            .with_temperature(config.model.temperature),
    );

    let logger = SessionLogger::open(Path::new(&config.logging.dir))?;
    println!("model: {}", config.model.name);
    println!("log:   {}", logger.path().display());
    println!();

    let token = CancellationToken::new();
    shutdown::spawn_interrupt_handler(token.clone());

    let (state_tx, state_rx) = watch::channel(DisplayState::default());
    let display = DisplayLoop::new(
        state_rx,
        Duration::from_millis(config.display.refresh_ms.max(1)),
    );
    let display_task = tokio::spawn(display.run(token.clone()));

    let worker = Worker::new(engine, SensorArray::new(), logger, &config, state_tx);
    let result = worker.run(token.clone()).await;

    // Worker ended (graceful stop or fatal log error): release the display
    // so it can render the summary.
    token.cancel();
    let _ = display_task.await;

    let summary = result?;
    tracing::info!(
        "session ended: {} thoughts, {} surfaced",
        summary.thoughts,
        summary.surfaced
    );
    Ok(())
}
