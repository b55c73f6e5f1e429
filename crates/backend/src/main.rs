// =============================================================================
// CSR Backend - API Server Entry Point
// =============================================================================

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use csr_backend::config::Config;
use csr_backend::db::Database;
use csr_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Try current directory first, then crates/backend/
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_filename("crates/backend/.env");
    }

    let config = Config::from_env()?;
    let bind_addr = config.bind_address.clone();

    // Ensure database directory exists for SQLite
    if let Some(db_path) = config.sqlite_file() {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let db = Database::new(&config.database_url).await?;
    db.run_migrations().await?;

    if config.seed_demo_data {
        let report = db.seed_demo_data().await;
        if report.failures() > 0 {
            tracing::warn!("Seeding finished with {} failed table(s)", report.failures());
        }
    }

    let state = AppState { db };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("CSR dashboard API running on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
