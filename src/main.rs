use anyhow::Context;
use realty_site::api::{self, AppState};
use realty_site::config::Config;
use realty_site::repository::{sample_listings, seed_if_empty};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🏠 Realty Site");
    info!("==============");

    let config = Config::from_env();
    let args: Vec<String> = std::env::args().collect();

    // CLI mode: --seed
    if args.iter().any(|a| a == "--seed") {
        let stores = config.stores()?;
        let seeded = seed_if_empty(stores.listings.as_ref(), &sample_listings()).await?;
        if seeded {
            info!("🌱 Seeded {} sample listings", sample_listings().len());
        } else {
            info!("Store already populated, nothing to seed");
        }
        return Ok(());
    }

    if config.demo_mode() {
        warn!("Running in demo mode: sample catalogue, demo admin login");
    }

    let state = AppState::from_config(&config)?;
    state.start().await;

    let app = api::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("🚀 Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Server error")?;

    info!("Shutting down");
    state.shutdown().await;
    Ok(())
}
