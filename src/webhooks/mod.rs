//! # Webhook Notifications
//!
//! Decoding of the notification bodies the platform delivers to the webhook
//! endpoint. Decoding is pure and can run concurrently on independent bodies.
//! Serving the endpoint and verifying signatures is left to the host
//! application.

pub mod handler;
pub mod schemas;

use crate::{
    consts,
    errors::{Result, WhatsAppError},
};
use schemas::{Change, Message, Notification, Status};

/// Decodes a raw notification body.
///
/// Fails with [`WhatsAppError::Decode`] on malformed JSON, on a missing
/// required field and on a message whose populated payload does not match its
/// `type`.
pub fn decode_notification(body: &[u8]) -> Result<Notification> {
    serde_json::from_slice(body).map_err(|err| WhatsAppError::decode(&err, body))
}

impl Change {
    /// Only `messages` changes carry messages, statuses and their errors.
    /// Other fields (account updates, template reviews ...) are ignored by the
    /// helpers below and by [`handler::process_notification`].
    pub fn is_messages(&self) -> bool {
        self.field == consts::WEBHOOK_MESSAGES_FIELD
    }
}

impl Notification {
    /// Inbound messages of every `messages` change, in payload order
    pub fn messages(&self) -> Vec<&Message> {
        self.entry
            .iter()
            .flat_map(|entry| &entry.changes)
            .filter(|change| change.is_messages())
            .filter_map(|change| change.value.messages.as_ref())
            .flatten()
            .collect()
    }

    /// Status updates of every `messages` change, in payload order
    pub fn statuses(&self) -> Vec<&Status> {
        self.entry
            .iter()
            .flat_map(|entry| &entry.changes)
            .filter(|change| change.is_messages())
            .filter_map(|change| change.value.statuses.as_ref())
            .flatten()
            .collect()
    }
}
