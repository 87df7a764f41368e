pub mod signature;
pub mod webhook;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::types::Settings;
use crate::error::SentinelError;
use crate::handlers::Dispatcher;

pub const SERVICE_NAME: &str = "PR Sentinel";

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub webhook_secret: Arc<str>,
}

impl IntoResponse for SentinelError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the logs.
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({"detail": detail}))).into_response()
    }
}

pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/webhook", post(webhook::handle_webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Bind and serve until Ctrl-C.
pub async fn start_server(
    settings: &Settings,
    dispatcher: Arc<Dispatcher>,
) -> Result<(), SentinelError> {
    let state = AppState {
        dispatcher,
        webhook_secret: Arc::from(settings.github.webhook_secret.as_str()),
    };
    let app = build_router(state, settings.server.body_limit);

    let listener = bind_listener(&settings.server.host, settings.server.port).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SentinelError::Other(format!("server error: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

/// Bind the webhook listener. `host` may be an IP literal or a hostname.
async fn bind_listener(host: &str, port: u16) -> Result<TcpListener, SentinelError> {
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|e| SentinelError::Other(format!("failed to bind to {host}:{port}: {e}")))?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "starting webhook server");
    Ok(listener)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// GET /health
async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "healthy", "service": SERVICE_NAME}))
}

/// GET /
async fn service_info() -> impl IntoResponse {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "webhook": "POST /webhook",
            "health": "GET /health",
        },
    }))
}
