//! Command-line interface for sensor-publisher
//!
//! ```bash
//! RUST_LOG=debug sensor-publisher --config client.properties
//! ```

use clap::Parser;
use sensor_publisher::{run_publisher, Args, PublisherSettings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = PublisherSettings::from_args(&args)?;

    run_publisher(settings).await
}
