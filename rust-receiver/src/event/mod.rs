//! Event authentication and parsing.
//!
//! ## Processing Flow
//!
//! ```text
//! X-Hub-Signature + raw body → signature check → EventEnvelope → logged events
//! ```
//!
//! Authentication is all-or-nothing: the body is not decoded until its
//! signature has been verified.

pub mod types;

use tracing::info;

use crate::error::WebhookError;
use crate::signature::{parse_signature_header, verify_signature};

pub use types::{Entry, EventEnvelope, Message, MessagingEvent, Participant, PAGE_OBJECT};

/// Fixed response body for an accepted delivery.
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

/// Authenticate an event delivery and decode its envelope.
///
/// `raw_body` is the exact bytes received on the wire; `None` means the
/// transport never captured them, which is a deployment fault rather than a
/// client error. The checks run in a fixed order and the first failure wins.
pub fn authenticate_and_parse(
    signature_header: Option<&str>,
    raw_body: Option<&[u8]>,
    app_secret: &str,
) -> Result<EventEnvelope, WebhookError> {
    let header = signature_header.ok_or(WebhookError::MissingSignature)?;
    let hash = parse_signature_header(header)?;
    let body = raw_body.ok_or(WebhookError::RawBodyUnavailable)?;

    if !verify_signature(app_secret, body, hash) {
        return Err(WebhookError::SignatureMismatch);
    }

    parse_envelope(body)
}

/// Decode an already authenticated body, accepting only page deliveries.
pub fn parse_envelope(body: &[u8]) -> Result<EventEnvelope, WebhookError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| WebhookError::MalformedBody(e.to_string()))?;

    // The object check comes before any look at the entries.
    match value.get("object").and_then(|o| o.as_str()) {
        Some(PAGE_OBJECT) => {}
        other => return Err(WebhookError::NotPageObject(other.map(String::from))),
    }

    serde_json::from_value(value).map_err(|e| WebhookError::MalformedBody(e.to_string()))
}

/// Log every messaging event in arrival order and return how many there were.
pub fn observe_events(envelope: &EventEnvelope) -> usize {
    let mut count = 0;

    for event in envelope.messaging_events() {
        count += 1;
        match event.message_text() {
            Some(text) => info!(
                sender_id = %event.sender_id(),
                message_text = %text,
                "messaging_event_received"
            ),
            None => info!(sender_id = %event.sender_id(), "messaging_event_received"),
        }
    }

    info!(
        entry_count = envelope.entries().len(),
        event_count = count,
        "event_batch_received"
    );

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::sign_payload;

    const SECRET: &str = "my_test_app_secret";
    const BODY: &[u8] = br#"{"object":"page","entry":[{"messaging":[{"sender":{"id":"sender_123"},"message":{"text":"Hello World"}}]}]}"#;

    fn signed(body: &[u8]) -> String {
        sign_payload(SECRET, body).unwrap()
    }

    #[test]
    fn test_parses_signed_page_event() {
        let header = signed(BODY);
        let envelope = authenticate_and_parse(Some(header.as_str()), Some(BODY), SECRET).unwrap();

        assert_eq!(envelope.object, "page");
        let events: Vec<_> = envelope.messaging_events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sender_id(), "sender_123");
        assert_eq!(events[0].message_text(), Some("Hello World"));
        assert_eq!(observe_events(&envelope), 1);
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            authenticate_and_parse(None, Some(BODY), SECRET),
            Err(WebhookError::MissingSignature)
        );
    }

    #[test]
    fn test_bad_header_format() {
        for header in ["md5=abcdef", "sha1=", "sha1"] {
            assert_eq!(
                authenticate_and_parse(Some(header), Some(BODY), SECRET),
                Err(WebhookError::BadSignatureFormat)
            );
        }
    }

    #[test]
    fn test_header_checked_before_body_availability() {
        assert_eq!(
            authenticate_and_parse(None, None, SECRET),
            Err(WebhookError::MissingSignature)
        );
        assert_eq!(
            authenticate_and_parse(Some("md5=abc"), None, SECRET),
            Err(WebhookError::BadSignatureFormat)
        );
        assert_eq!(
            authenticate_and_parse(Some(signed(BODY).as_str()), None, SECRET),
            Err(WebhookError::RawBodyUnavailable)
        );
    }

    #[test]
    fn test_invalid_hash() {
        assert_eq!(
            authenticate_and_parse(Some("sha1=invalidhash"), Some(BODY), SECRET),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_tampered_body() {
        let header = signed(BODY);
        let tampered = String::from_utf8(BODY.to_vec())
            .unwrap()
            .replace("Hello World", "Hello Xorld");

        assert_eq!(
            authenticate_and_parse(Some(header.as_str()), Some(tampered.as_bytes()), SECRET),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_reserialized_body_is_not_equivalent() {
        // Same JSON value, different bytes.
        let pretty = serde_json::to_vec_pretty(&serde_json::from_slice::<serde_json::Value>(BODY).unwrap())
            .unwrap();
        let header = signed(BODY);

        assert_eq!(
            authenticate_and_parse(Some(header.as_str()), Some(pretty.as_slice()), SECRET),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_signature_checked_before_parsing() {
        let body: &[u8] = b"not json at all";
        assert_eq!(
            authenticate_and_parse(Some("sha1=invalidhash"), Some(body), SECRET),
            Err(WebhookError::SignatureMismatch)
        );

        let header = signed(body);
        assert!(matches!(
            authenticate_and_parse(Some(header.as_str()), Some(body), SECRET),
            Err(WebhookError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_non_page_object() {
        let body: &[u8] = br#"{"object":"instagram","entry":[{"messaging":"anything"}]}"#;
        let header = signed(body);
        assert_eq!(
            authenticate_and_parse(Some(header.as_str()), Some(body), SECRET),
            Err(WebhookError::NotPageObject(Some("instagram".to_string())))
        );

        let body: &[u8] = br#"{"entry":[]}"#;
        let header = signed(body);
        assert_eq!(
            authenticate_and_parse(Some(header.as_str()), Some(body), SECRET),
            Err(WebhookError::NotPageObject(None))
        );
    }

    #[test]
    fn test_entry_without_messaging() {
        let body: &[u8] = br#"{"object":"page","entry":[{"id":"1","changes":[]}]}"#;
        let envelope = authenticate_and_parse(Some(signed(body).as_str()), Some(body), SECRET).unwrap();
        assert_eq!(envelope.entries().len(), 1);
        assert_eq!(observe_events(&envelope), 0);
    }

    #[test]
    fn test_unread_fields_do_not_reject_page_events() {
        let body: &[u8] = br#"{"object":"page","entry":[{"id":42,"time":"soon","messaging":[{"sender":{"id":"sender_123"},"recipient":{"id":123},"timestamp":1.5,"message":{"mid":7,"text":"Hello World"}}]}]}"#;
        let envelope = authenticate_and_parse(Some(signed(body).as_str()), Some(body), SECRET).unwrap();

        let event = envelope.messaging_events().next().unwrap();
        assert_eq!(event.sender_id(), "sender_123");
        assert_eq!(event.message_text(), Some("Hello World"));
    }

    #[test]
    fn test_event_without_sender_is_malformed() {
        let body: &[u8] = br#"{"object":"page","entry":[{"messaging":[{"message":{"text":"hi"}}]}]}"#;
        assert!(matches!(
            authenticate_and_parse(Some(signed(body).as_str()), Some(body), SECRET),
            Err(WebhookError::MalformedBody(_))
        ));
    }
}
