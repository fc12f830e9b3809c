//! Subscription handshake verification.
//!
//! Before delivering events the platform sends a GET with `hub.mode`,
//! `hub.verify_token` and `hub.challenge`. Echoing the challenge proves we
//! own the endpoint.

use serde::Deserialize;
use tracing::info;

use crate::error::WebhookError;

/// The only mode the platform uses for the handshake.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Handshake query parameters, as sent by the platform.
#[derive(Debug, Default, Deserialize)]
pub struct HandshakeQuery {
    #[serde(default, rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(default, rename = "hub.verify_token")]
    pub token: Option<String>,
    #[serde(default, rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Verify a handshake and return the challenge to echo back.
///
/// An empty `mode` or `token` counts as missing. A missing challenge on an
/// otherwise valid handshake confirms with an empty string.
pub fn verify_handshake(
    query: &HandshakeQuery,
    expected_token: &str,
) -> Result<String, WebhookError> {
    let (mode, token) = match (non_empty(&query.mode), non_empty(&query.token)) {
        (Some(mode), Some(token)) => (mode, token),
        _ => return Err(WebhookError::MissingHandshakeParams),
    };

    if mode != SUBSCRIBE_MODE || token != expected_token {
        return Err(WebhookError::HandshakeRejected);
    }

    info!("webhook_verified");
    Ok(query.challenge.clone().unwrap_or_default())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(mode: Option<&str>, token: Option<&str>, challenge: Option<&str>) -> HandshakeQuery {
        HandshakeQuery {
            mode: mode.map(String::from),
            token: token.map(String::from),
            challenge: challenge.map(String::from),
        }
    }

    #[test]
    fn test_confirms_with_challenge_verbatim() {
        let q = query(Some("subscribe"), Some("tok"), Some(" 12345\n"));
        assert_eq!(verify_handshake(&q, "tok"), Ok(" 12345\n".to_string()));
    }

    #[test]
    fn test_confirms_with_empty_or_missing_challenge() {
        let q = query(Some("subscribe"), Some("tok"), Some(""));
        assert_eq!(verify_handshake(&q, "tok"), Ok(String::new()));

        let q = query(Some("subscribe"), Some("tok"), None);
        assert_eq!(verify_handshake(&q, "tok"), Ok(String::new()));
    }

    #[test]
    fn test_wrong_token_is_rejected() {
        let q = query(Some("subscribe"), Some("WRONG"), Some("12345"));
        assert_eq!(verify_handshake(&q, "tok"), Err(WebhookError::HandshakeRejected));

        // exact equality, no case folding or trimming
        let q = query(Some("subscribe"), Some("TOK"), Some("12345"));
        assert_eq!(verify_handshake(&q, "tok"), Err(WebhookError::HandshakeRejected));
        let q = query(Some("subscribe"), Some("tok "), Some("12345"));
        assert_eq!(verify_handshake(&q, "tok"), Err(WebhookError::HandshakeRejected));
    }

    #[test]
    fn test_wrong_mode_is_rejected() {
        let q = query(Some("unsubscribe"), Some("tok"), Some("12345"));
        assert_eq!(verify_handshake(&q, "tok"), Err(WebhookError::HandshakeRejected));
    }

    #[test]
    fn test_missing_mode_or_token_is_malformed() {
        for q in [
            query(None, Some("tok"), Some("1")),
            query(Some("subscribe"), None, Some("1")),
            query(None, None, None),
            query(Some(""), Some("tok"), Some("1")),
            query(Some("subscribe"), Some(""), Some("1")),
        ] {
            assert_eq!(
                verify_handshake(&q, "tok"),
                Err(WebhookError::MissingHandshakeParams)
            );
        }
    }

    #[test]
    fn test_query_deserializes_hub_names() {
        let q: HandshakeQuery = serde_json::from_str(
            r#"{"hub.mode":"subscribe","hub.verify_token":"tok","hub.challenge":"c"}"#,
        )
        .unwrap();
        assert_eq!(q.mode.as_deref(), Some("subscribe"));
        assert_eq!(q.token.as_deref(), Some("tok"));
        assert_eq!(q.challenge.as_deref(), Some("c"));
    }
}
