//! Event envelope types for page subscription deliveries.
//!
//! Only the fields this receiver reads are modelled; everything else in the
//! payload is ignored by serde.

use serde::{Deserialize, Serialize};

/// Envelope discriminator for page subscription deliveries.
pub const PAGE_OBJECT: &str = "page";

/// Top-level event delivery.
///
/// The platform may batch several entries into one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Subscription type, `"page"` for everything this endpoint accepts
    pub object: String,
    /// Batched entries, in delivery order
    #[serde(default)]
    pub entry: Option<Vec<Entry>>,
}

/// One entry of a batched delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Messaging events; absent for entries that only carry other changes
    #[serde(default)]
    pub messaging: Option<Vec<MessagingEvent>>,
}

/// A single messaging event inside an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagingEvent {
    pub sender: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// Page-scoped id of a conversation participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl EventEnvelope {
    pub fn entries(&self) -> &[Entry] {
        self.entry.as_deref().unwrap_or(&[])
    }

    /// All messaging events across every entry, in arrival order.
    pub fn messaging_events(&self) -> impl Iterator<Item = &MessagingEvent> {
        self.entries().iter().flat_map(|entry| entry.messaging_events())
    }
}

impl Entry {
    pub fn messaging_events(&self) -> &[MessagingEvent] {
        self.messaging.as_deref().unwrap_or(&[])
    }
}

impl MessagingEvent {
    pub fn sender_id(&self) -> &str {
        &self.sender.id
    }

    pub fn message_text(&self) -> Option<&str> {
        self.message.as_ref()?.text.as_deref()
    }
}
