// =============================================================================
// CSR Monitor - Entry Point
// =============================================================================

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use csr_monitor::{HttpSource, MonitorConfig, Poller, StderrAlert};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Try current directory first, then crates/monitor/
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_filename("crates/monitor/.env");
    }

    let config = MonitorConfig::from_env()?;
    tracing::info!(
        "Polling {} every {}s",
        config.api_url,
        config.poll_interval.as_secs()
    );

    let source = HttpSource::new(&config)?;
    let mut poller = Poller::new(source, StderrAlert, config.poll_interval);

    poller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C, stopping: {}", e);
            }
        })
        .await;

    Ok(())
}
