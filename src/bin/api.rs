use assistant_router::{api::start_server, AssistantRouter, RouterConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables first so RUST_LOG from .env reaches the filter
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RouterConfig::from_env()?;

    info!("🚀 Assistant Router - API Server");
    info!("📍 Port: {}", config.port);

    if config.kb_location.is_none() {
        warn!("⚠️  KB_BUCKET not set; chat requests will fail with ServerConfigError");
    }

    let router = Arc::new(AssistantRouter::from_config(&config)?);

    info!(
        kb_key = %config.kb_key,
        dialogue_engine = config.dialogue_enabled(),
        language_service = config.language_service_url.is_some(),
        sentiment = config.use_sentiment,
        "✅ Router initialized"
    );
    info!("📡 Starting API server...");

    start_server(router, config.port).await?;

    Ok(())
}
