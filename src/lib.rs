// genai-relay - keeps the Google API key server-side while relaying
// text, image and audio generation requests from browser front-ends.

pub mod api;
pub mod config;
pub mod proxy;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::load()?;

    tracing::info!("Starting API server...");
    api::start_server(config).await
}
