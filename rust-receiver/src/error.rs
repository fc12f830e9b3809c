//! Rejection reasons for handshake and event requests.
//!
//! Every failure is terminal for the request it concerns. Callers only ever
//! see the status code and its reason phrase; the variant detail stays in
//! the server logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Coarse classification of a [`WebhookError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request is missing something the caller must supply.
    ClientMalformed,
    /// The caller could not prove it holds the shared secret or token.
    AuthRejected,
    /// Authentic, but not an event this endpoint accepts.
    NotFound,
    /// Deployment fault on our side.
    ServerMisconfigured,
}

/// Why a handshake or event delivery was refused.
///
/// The `Display` text is for server logs only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("handshake is missing hub.mode or hub.verify_token")]
    MissingHandshakeParams,

    #[error("handshake query string could not be decoded: {0}")]
    InvalidQuery(String),

    #[error("handshake mode or verify token did not match")]
    HandshakeRejected,

    #[error("request carries no signature header")]
    MissingSignature,

    #[error("signature header is not of the form sha1=<hex>")]
    BadSignatureFormat,

    #[error("raw request body was not captured; the body capture middleware is not installed")]
    RawBodyUnavailable,

    #[error("signature does not match the request body")]
    SignatureMismatch,

    #[error("request body is not a valid event envelope: {0}")]
    MalformedBody(String),

    #[error("event object is {0:?}, expected \"page\"")]
    NotPageObject(Option<String>),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("request body could not be read: {0}")]
    UnreadableBody(String),
}

impl WebhookError {
    /// Classify the rejection.
    ///
    /// Only [`WebhookError::RawBodyUnavailable`] is a fault on our side.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WebhookError::MissingHandshakeParams
            | WebhookError::InvalidQuery(_)
            | WebhookError::MalformedBody(_)
            | WebhookError::PayloadTooLarge { .. }
            | WebhookError::UnreadableBody(_) => ErrorKind::ClientMalformed,
            WebhookError::HandshakeRejected
            | WebhookError::MissingSignature
            | WebhookError::BadSignatureFormat
            | WebhookError::SignatureMismatch => ErrorKind::AuthRejected,
            WebhookError::NotPageObject(_) => ErrorKind::NotFound,
            WebhookError::RawBodyUnavailable => ErrorKind::ServerMisconfigured,
        }
    }

    /// HTTP status returned to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingHandshakeParams
            | WebhookError::InvalidQuery(_)
            | WebhookError::MalformedBody(_)
            | WebhookError::UnreadableBody(_) => StatusCode::BAD_REQUEST,
            WebhookError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            WebhookError::HandshakeRejected
            | WebhookError::MissingSignature
            | WebhookError::BadSignatureFormat
            | WebhookError::SignatureMismatch => StatusCode::FORBIDDEN,
            WebhookError::NotPageObject(_) => StatusCode::NOT_FOUND,
            WebhookError::RawBodyUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self.kind() {
            ErrorKind::ServerMisconfigured => {
                error!(status = status.as_u16(), reason = %self, "webhook_server_misconfigured")
            }
            kind => {
                warn!(status = status.as_u16(), kind = ?kind, reason = %self, "webhook_rejected")
            }
        }

        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}
