// HTTP API Server module

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::proxy::ingress::Credential;
use crate::proxy::router::TargetRouter;
use crate::proxy::Gateway;

pub mod gemini;
mod handlers;

use gemini::GeminiClient;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

/// Build the gateway from config plus the credential read at startup.
pub fn build_gateway(config: &AppConfig, credential: Option<Credential>) -> Result<Gateway> {
    let upstream = GeminiClient::with_timeout(config.upstream_timeout())
        .context("Failed to build upstream HTTP client")?;

    Ok(Gateway::new(
        credential,
        TargetRouter::new(config.upstream_base_url.clone()),
        Arc::new(upstream),
    )
    .with_messages(config.messages.clone()))
}

/// Build the axum router. The gateway answers every method and path itself,
/// CORS preflight included. Payload size is left to the upstream to police.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::relay)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let credential = Credential::from_env(&config.credential_env);
    if credential.is_none() {
        // Not fatal: every relayed request will answer 500 until the secret is provisioned.
        tracing::error!(
            "{} is not set; requests will be rejected until the secret is configured",
            config.credential_env
        );
    }

    let gateway = build_gateway(&config, credential)?;
    let app = router(AppState::new(gateway));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        upstream = %config.upstream_base_url,
        "API server listening on {}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
