use assetflow::cli::{Cli, run_command};
use assetflow::config::constants;
use assetflow::logging;
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    constants::init_constants();

    let (file_layer, log_error) = match logging::create_log_file() {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_level(true)
                    .with_filter(EnvFilter::new("debug")),
            ),
            None,
        ),
        Err(e) => (None, Some(e.to_string())),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_level(true)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                ),
        )
        .with(file_layer)
        .init();

    if let Some(e) = log_error {
        warn!("Logging to console only: {}", e);
    }

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> assetflow::error::Result<()> {
    let args = Cli::parse();
    let root = std::env::current_dir()?;
    run_command(args.command(), &root).await
}
