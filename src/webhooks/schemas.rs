//! # WhatsApp Webhook Schemas
//!
//! Data structures for the notifications the platform POSTs to the webhook
//! endpoint: `Notification -> Entry -> Change -> Value`, where a value carries
//! any combination of contacts, messages, statuses and errors.
//!
//! Inbound messages are a sum type. On the wire a message has a `type`
//! discriminator and one optional payload field per kind; decoding goes
//! through [`RawMessage`] and rejects payloads whose populated field does not
//! match `type`.

use crate::models::{Contact as ContactCard, InteractiveReply, Location, Reaction, Text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Root webhook payload
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Notification {
    /// Typically "whatsapp_business_account"
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// Changes of one business account
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Entry {
    /// Business account id
    pub id: String,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Change {
    /// Field that changed, "messages" for message and status events
    pub field: String,
    pub value: Value,
}

/// Event data. The arrays are independent, any of them may be present.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Value {
    pub messaging_product: String,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<Status>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<WebhookError>>,
}

/// Business phone number that received the event
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Metadata {
    pub display_phone_number: String,
    pub phone_number_id: String,
}

/// Sender of an inbound message
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    pub wa_id: String,
}

impl Contact {
    /// Profile name, empty when the platform did not send one
    pub fn name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|profile| profile.name.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
}

/// Inbound message
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawMessage", into = "RawMessage")]
pub struct Message {
    /// Sender's WhatsApp id
    pub from: String,
    pub id: String,
    /// Unix epoch seconds, as sent by the platform
    pub timestamp: String,
    /// Set when the message replies to or was forwarded from another one
    pub context: Option<MessageContext>,
    /// Processing errors, typically for `unsupported` messages
    pub errors: Option<Vec<WebhookError>>,
    pub content: MessageContent,
}

impl Message {
    /// Wire `type` discriminator of the message
    pub fn kind(&self) -> &str {
        self.content.kind()
    }

    /// Timestamp as a UTC date time, `None` if not a valid epoch
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        parse_epoch(&self.timestamp)
    }
}

/// Payload of an inbound message, one variant per `type`
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(Text),
    Reaction(Reaction),
    Location(Location),
    Contacts(Vec<ContactCard>),
    Audio(Media),
    Document(Media),
    Image(Media),
    Sticker(Media),
    Video(Media),
    Interactive(InteractiveReply),
    Button(QuickReply),
    /// Any other type, including "unsupported". Carries no payload.
    Other(String),
}

impl MessageContent {
    pub fn kind(&self) -> &str {
        match self {
            MessageContent::Text(_) => "text",
            MessageContent::Reaction(_) => "reaction",
            MessageContent::Location(_) => "location",
            MessageContent::Contacts(_) => "contacts",
            MessageContent::Audio(_) => "audio",
            MessageContent::Document(_) => "document",
            MessageContent::Image(_) => "image",
            MessageContent::Sticker(_) => "sticker",
            MessageContent::Video(_) => "video",
            MessageContent::Interactive(_) => "interactive",
            MessageContent::Button(_) => "button",
            MessageContent::Other(kind) => kind,
        }
    }
}

/// Received media. Content is fetched separately with the media id.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Media {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Stickers only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

/// Quick reply button pressed on a template message
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuickReply {
    pub payload: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MessageContext {
    /// Sender of the referenced message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Referenced message id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequently_forwarded: Option<bool>,
}

/// Delivery status of a message sent by the business
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Status {
    /// Id of the sent message
    pub id: String,
    /// sent, delivered, read or failed
    pub status: String,
    #[serde(default, deserialize_with = "epoch_as_string")]
    pub timestamp: String,
    pub recipient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<WebhookError>>,
}

impl Status {
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        parse_epoch(&self.timestamp)
    }

    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<ConversationOrigin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConversationOrigin {
    /// business_initiated, user_initiated, referral_conversion ...
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Pricing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Error reported inside a notification
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WebhookError {
    #[serde(default)]
    pub code: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_data: Option<WebhookErrorData>,
}

impl WebhookError {
    /// Most specific description available
    pub fn details(&self) -> &str {
        self.error_data
            .as_ref()
            .map(|data| data.details.as_str())
            .or(self.details.as_deref())
            .or(self.message.as_deref())
            .unwrap_or(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WebhookErrorData {
    pub details: String,
}

fn parse_epoch(timestamp: &str) -> Option<DateTime<Utc>> {
    timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Epoch {
    Text(String),
    Seconds(i64),
}

/// Reads a timestamp sent either as `"1700000000"` or `1700000000`
fn epoch_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Epoch::deserialize(deserializer)? {
        Epoch::Text(text) => text,
        Epoch::Seconds(secs) => secs.to_string(),
    })
}

/// Message exactly as it appears on the wire
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawMessage {
    pub from: String,
    pub id: String,
    #[serde(default, deserialize_with = "epoch_as_string")]
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<WebhookError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Reaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<ContactCard>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<QuickReply>,
}

impl RawMessage {
    /// Names of the payload fields carrying a value
    fn populated(&self) -> Vec<&'static str> {
        [
            ("text", self.text.is_some()),
            ("reaction", self.reaction.is_some()),
            ("location", self.location.is_some()),
            (
                "contacts",
                self.contacts.as_ref().is_some_and(|contacts| !contacts.is_empty()),
            ),
            ("audio", self.audio.is_some()),
            ("document", self.document.is_some()),
            ("image", self.image.is_some()),
            ("sticker", self.sticker.is_some()),
            ("video", self.video.is_some()),
            ("interactive", self.interactive.is_some()),
            ("button", self.button.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    fn into_content(self) -> Result<MessageContent, String> {
        let populated = self.populated();
        if let Some(stray) = populated.iter().find(|name| **name != self.kind.as_str()) {
            return Err(format!(
                "message {} of type {:?} also carries a {stray} payload",
                self.id, self.kind
            ));
        }

        let missing = || format!("message {} of type {:?} has no payload", self.id, self.kind);
        let content = match self.kind.as_str() {
            "text" => MessageContent::Text(self.text.ok_or_else(missing)?),
            "reaction" => MessageContent::Reaction(self.reaction.ok_or_else(missing)?),
            "location" => MessageContent::Location(self.location.ok_or_else(missing)?),
            "contacts" => MessageContent::Contacts(self.contacts.ok_or_else(missing)?),
            "audio" => MessageContent::Audio(self.audio.ok_or_else(missing)?),
            "document" => MessageContent::Document(self.document.ok_or_else(missing)?),
            "image" => MessageContent::Image(self.image.ok_or_else(missing)?),
            "sticker" => MessageContent::Sticker(self.sticker.ok_or_else(missing)?),
            "video" => MessageContent::Video(self.video.ok_or_else(missing)?),
            "interactive" => MessageContent::Interactive(self.interactive.ok_or_else(missing)?),
            "button" => MessageContent::Button(self.button.ok_or_else(missing)?),
            other => MessageContent::Other(other.to_string()),
        };

        Ok(content)
    }
}

impl TryFrom<RawMessage> for Message {
    type Error = String;

    fn try_from(mut raw: RawMessage) -> Result<Self, Self::Error> {
        let from = std::mem::take(&mut raw.from);
        let id = raw.id.clone();
        let timestamp = std::mem::take(&mut raw.timestamp);
        let context = raw.context.take();
        let errors = raw.errors.take();

        Ok(Message {
            from,
            id,
            timestamp,
            context,
            errors,
            content: raw.into_content()?,
        })
    }
}

impl From<Message> for RawMessage {
    fn from(message: Message) -> Self {
        let mut raw = RawMessage {
            from: message.from,
            id: message.id,
            timestamp: message.timestamp,
            kind: message.content.kind().to_string(),
            context: message.context,
            errors: message.errors,
            ..Default::default()
        };

        match message.content {
            MessageContent::Text(text) => raw.text = Some(text),
            MessageContent::Reaction(reaction) => raw.reaction = Some(reaction),
            MessageContent::Location(location) => raw.location = Some(location),
            MessageContent::Contacts(contacts) => raw.contacts = Some(contacts),
            MessageContent::Audio(media) => raw.audio = Some(media),
            MessageContent::Document(media) => raw.document = Some(media),
            MessageContent::Image(media) => raw.image = Some(media),
            MessageContent::Sticker(media) => raw.sticker = Some(media),
            MessageContent::Video(media) => raw.video = Some(media),
            MessageContent::Interactive(reply) => raw.interactive = Some(reply),
            MessageContent::Button(button) => raw.button = Some(button),
            MessageContent::Other(_) => {}
        }

        raw
    }
}
