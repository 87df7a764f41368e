use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{Value, json};

use super::AppState;
use super::signature;
use crate::error::SentinelError;
use crate::events::{EventKind, EventPayload};

const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const EVENT_HEADER: &str = "x-github-event";

/// POST /webhook
///
/// Steps:
/// 1. Verify the HMAC-SHA256 signature over the raw body
/// 2. Classify the event; unknown events are acknowledged and dropped
/// 3. Parse the typed payload
/// 4. Run the handler on its own task and wait for it, so a panic in a
///    handler becomes a 500 instead of taking the server down. If the caller
///    hangs up, only the wait is dropped; the task runs to completion.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, SentinelError> {
    let signature_header = header(&headers, SIGNATURE_HEADER)
        .ok_or_else(|| SentinelError::Authentication("missing signature".into()))?;

    if !signature::verify(&state.webhook_secret, &body, signature_header) {
        tracing::warn!("webhook signature verification failed");
        return Err(SentinelError::Authentication("invalid signature".into()));
    }

    let event = header(&headers, EVENT_HEADER).ok_or_else(|| {
        SentinelError::MalformedRequest("missing X-GitHub-Event header".into())
    })?;

    if let Err(e) = serde_json::from_slice::<Value>(&body) {
        tracing::warn!(error = %e, "failed to parse webhook payload");
        return Err(SentinelError::MalformedRequest("invalid JSON payload".into()));
    }

    let Some(kind) = EventKind::classify(event) else {
        tracing::info!(event, "ignoring unsupported event type");
        return Ok(ok());
    };

    let payload = EventPayload::parse(kind, &body)?;
    tracing::info!(event, action = payload.action(), repo = payload.repository(), "received webhook");

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move { dispatcher.dispatch(payload).await })
        .await
        .map_err(|e| {
            tracing::error!(event, error = %e, "event handler task failed");
            SentinelError::Other(format!("event handler failed: {e}"))
        })?;

    Ok(ok())
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn ok() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
