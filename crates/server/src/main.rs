//! SocialPulse Server entry point.

use socialpulse_server::{app, frontend, AppState, MemStorage, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socialpulse_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let storage = if config.seed_demo {
        MemStorage::with_demo_data().await?
    } else {
        MemStorage::new()
    };
    let state = AppState::new(storage);

    let router = frontend::with_frontend_fallback(app(state), &config.frontend);

    // Start server
    tracing::info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
