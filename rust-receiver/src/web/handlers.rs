//! Webhook endpoint handlers.
//!
//! These handlers only:
//! 1. Verify the handshake or the payload signature
//! 2. Log the messaging events of an accepted delivery
//! 3. Return a fixed or echoed plain-text body

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::WebhookError;
use crate::event::{authenticate_and_parse, observe_events, EVENT_RECEIVED};
use crate::handshake::{verify_handshake, HandshakeQuery};
use crate::signature::SIGNATURE_HEADER;
use crate::web::raw_body::RawBody;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Subscription Handshake
// =============================================================================

/// Handshake endpoint.
///
/// Echoes `hub.challenge` as `text/plain` when mode and token match. A query
/// string axum cannot decode (repeated `hub.*` keys, bad escapes) is a 400
/// without the rejection text.
pub async fn verify_webhook(
    State(state): State<AppState>,
    query: Result<Query<HandshakeQuery>, QueryRejection>,
) -> Result<String, WebhookError> {
    let Query(query) = query.map_err(|e| WebhookError::InvalidQuery(e.body_text()))?;
    verify_handshake(&query, &state.config.verify_token)
}

// =============================================================================
// Event Delivery
// =============================================================================

/// Event delivery endpoint.
///
/// The raw body comes from [`crate::web::capture_raw_body`]; without that
/// middleware every signed delivery fails with 500.
pub async fn receive_events(
    State(state): State<AppState>,
    raw_body: Option<Extension<RawBody>>,
    headers: HeaderMap,
) -> Result<&'static str, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str().map_err(|_| WebhookError::BadSignatureFormat))
        .transpose()?;

    let raw_body: Option<&[u8]> = raw_body.as_ref().map(|Extension(RawBody(bytes))| &bytes[..]);

    info!(
        has_signature = signature.is_some(),
        body_length = raw_body.map(|b| b.len()).unwrap_or(0),
        "event_delivery_received"
    );

    let envelope = authenticate_and_parse(signature, raw_body, &state.config.app_secret)?;
    observe_events(&envelope);

    Ok(EVENT_RECEIVED)
}
