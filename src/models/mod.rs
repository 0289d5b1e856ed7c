//! # Shared Message Models
//!
//! Value objects used both when sending messages and when decoding webhook
//! notifications. The JSON shape of each type matches the Cloud API payloads.

pub mod contact;
pub mod interactive;
pub mod location;
pub mod media;
pub mod template;

pub use contact::*;
pub use interactive::*;
pub use location::*;
pub use media::*;
pub use template::*;

use serde::{Deserialize, Serialize};

/// Text body of a message
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Text {
    pub body: String,
    /// Only meaningful on outgoing messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<bool>,
}

/// Emoji reaction to a previous message. An empty emoji removes the reaction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Reaction {
    pub message_id: String,
    #[serde(default)]
    pub emoji: String,
}
