//! PageHook - webhook receiver for page messaging subscriptions.
//!
//! This library provides the modules shared by the two binaries:
//! - `pagehook-web`: the webhook endpoint
//! - `pagehook-tester`: replays signed test deliveries against a running endpoint
//!
//! ## Architecture
//!
//! ```text
//! GET  /webhook → handshake::verify_handshake → challenge
//! POST /webhook → capture_raw_body → event::authenticate_and_parse → EVENT_RECEIVED
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod handshake;
pub mod signature;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorKind, WebhookError};
pub use event::{authenticate_and_parse, EventEnvelope, MessagingEvent, EVENT_RECEIVED};
pub use handshake::{verify_handshake, HandshakeQuery};
pub use signature::{sign_payload, verify_signature};
pub use web::{router, AppState};
