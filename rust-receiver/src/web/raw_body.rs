//! Raw body capture.
//!
//! Signature verification needs the exact bytes from the wire. This
//! middleware buffers the body once, stores a copy as a [`RawBody`]
//! extension and hands the same bytes on to the inner handler.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http_body_util::LengthLimitError;
use tracing::warn;

use crate::error::WebhookError;
use crate::web::AppState;

/// Unmodified request body, captured before any decoding.
#[derive(Debug, Clone)]
pub struct RawBody(pub Bytes);

/// Buffer the request body (up to `max_body_bytes`) into a [`RawBody`] extension.
pub async fn capture_raw_body(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, WebhookError> {
    let limit = state.config.max_body_bytes;
    let (parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
        warn!(limit = limit, error = %e, "raw_body_read_failed");
        if is_length_limit(&e) {
            WebhookError::PayloadTooLarge { limit }
        } else {
            WebhookError::UnreadableBody(e.to_string())
        }
    })?;

    let mut request = Request::from_parts(parts, Body::from(bytes.clone()));
    request.extensions_mut().insert(RawBody(bytes));

    Ok(next.run(request).await)
}

/// Whether a body read failed because it hit the size limit.
fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
