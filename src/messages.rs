//! # Outgoing Messages
//!
//! Caller-facing value objects for every message kind, the JSON envelope sent
//! to `/{phone_number_id}/messages`, and the builders mapping one to the
//! other. Builders are pure: the only thing they can report is a
//! [`WhatsAppError::Validation`] for a missing or ambiguous field.

use crate::{
    client::{
        dispatch::{Request, RequestContext},
        state::ConfigSnapshot,
    },
    consts,
    errors::{Result, WhatsAppError},
    models::{Contact, Interactive, Location, MediaReference, MediaType, Reaction, Template, Text},
    transport::Method,
};
use serde::{Deserialize, Serialize};

/// Text message to send
#[derive(Debug, Clone, PartialEq)]
pub struct TextMessage {
    pub body: String,
    pub preview_url: bool,
}

impl TextMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            preview_url: false,
        }
    }
}

/// Reaction to send; an empty emoji removes an existing reaction
#[derive(Debug, Clone, PartialEq)]
pub struct ReactMessage {
    pub message_id: String,
    pub emoji: String,
}

/// Media message referencing either an uploaded media id or a public link
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMessage {
    pub media_type: MediaType,
    pub media_id: Option<String>,
    pub media_link: Option<String>,
    pub caption: Option<String>,
    pub filename: Option<String>,
    pub provider: Option<String>,
}

/// Content allowed in a reply. Reactions cannot be sent as replies.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyContent {
    Text(TextMessage),
    Location(Location),
    Media(MediaMessage),
    Template(Template),
    Contacts(Vec<Contact>),
}

/// Message sent in reply to a previously received one
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyMessage {
    /// Id of the message being replied to
    pub context: String,
    pub content: ReplyContent,
}

/// Payload of an outgoing message, tagged by the wire `type` field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingContent {
    Text { text: Text },
    Reaction { reaction: Reaction },
    Audio { audio: MediaReference },
    Document { document: MediaReference },
    Image { image: MediaReference },
    Sticker { sticker: MediaReference },
    Video { video: MediaReference },
    Location { location: Location },
    Contacts { contacts: Vec<Contact> },
    Template { template: Template },
    Interactive { interactive: Interactive },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyContext {
    pub message_id: String,
}

/// JSON envelope of every message sent to the `messages` endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub messaging_product: String,
    pub recipient_type: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ReplyContext>,
    #[serde(flatten)]
    pub content: OutgoingContent,
}

fn invalid(msg: impl Into<String>) -> WhatsAppError {
    WhatsAppError::Validation(msg.into())
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    Ok(())
}

impl OutgoingMessage {
    fn new(recipient: &str, content: OutgoingContent) -> Result<Self> {
        require(recipient, "recipient")?;

        Ok(Self {
            messaging_product: consts::MESSAGING_PRODUCT.to_string(),
            recipient_type: consts::RECIPIENT_TYPE_INDIVIDUAL.to_string(),
            to: recipient.to_string(),
            context: None,
            content,
        })
    }

    pub fn text(recipient: &str, message: &TextMessage) -> Result<Self> {
        require(&message.body, "text body")?;

        Self::new(
            recipient,
            OutgoingContent::Text {
                text: Text {
                    body: message.body.clone(),
                    preview_url: Some(message.preview_url),
                },
            },
        )
    }

    pub fn reaction(recipient: &str, message: &ReactMessage) -> Result<Self> {
        require(&message.message_id, "reaction message id")?;

        Self::new(
            recipient,
            OutgoingContent::Reaction {
                reaction: Reaction {
                    message_id: message.message_id.clone(),
                    emoji: message.emoji.clone(),
                },
            },
        )
    }

    pub fn media(recipient: &str, message: &MediaMessage) -> Result<Self> {
        let media = MediaReference {
            id: message.media_id.clone(),
            link: message.media_link.clone(),
            caption: message.caption.clone(),
            filename: message.filename.clone(),
            provider: message.provider.clone(),
        };
        media.check().map_err(invalid)?;

        if media.caption.is_some() && !message.media_type.accepts_caption() {
            return Err(invalid(format!(
                "{} messages do not support a caption",
                message.media_type
            )));
        }
        if media.filename.is_some() && message.media_type != MediaType::Document {
            return Err(invalid("only document messages support a filename"));
        }

        let content = match message.media_type {
            MediaType::Audio => OutgoingContent::Audio { audio: media },
            MediaType::Document => OutgoingContent::Document { document: media },
            MediaType::Image => OutgoingContent::Image { image: media },
            MediaType::Sticker => OutgoingContent::Sticker { sticker: media },
            MediaType::Video => OutgoingContent::Video { video: media },
        };

        Self::new(recipient, content)
    }

    pub fn location(recipient: &str, location: &Location) -> Result<Self> {
        if !location.has_valid_coordinates() {
            return Err(invalid(format!(
                "invalid coordinates ({}, {})",
                location.latitude, location.longitude
            )));
        }

        Self::new(
            recipient,
            OutgoingContent::Location {
                location: location.clone(),
            },
        )
    }

    pub fn contacts(recipient: &str, contacts: &[Contact]) -> Result<Self> {
        if contacts.is_empty() {
            return Err(invalid("at least one contact is required"));
        }
        for contact in contacts {
            require(&contact.name.formatted_name, "contact formatted_name")?;
        }

        Self::new(
            recipient,
            OutgoingContent::Contacts {
                contacts: contacts.to_vec(),
            },
        )
    }

    pub fn template(recipient: &str, template: &Template) -> Result<Self> {
        require(&template.name, "template name")?;
        require(&template.language.code, "template language code")?;

        Self::new(
            recipient,
            OutgoingContent::Template {
                template: template.clone(),
            },
        )
    }

    pub fn interactive(recipient: &str, interactive: &Interactive) -> Result<Self> {
        interactive.check().map_err(invalid)?;

        Self::new(
            recipient,
            OutgoingContent::Interactive {
                interactive: interactive.clone(),
            },
        )
    }

    pub fn reply(recipient: &str, message: &ReplyMessage) -> Result<Self> {
        require(&message.context, "reply context message id")?;

        let mut outgoing = match &message.content {
            ReplyContent::Text(text) => Self::text(recipient, text)?,
            ReplyContent::Location(location) => Self::location(recipient, location)?,
            ReplyContent::Media(media) => Self::media(recipient, media)?,
            ReplyContent::Template(template) => Self::template(recipient, template)?,
            ReplyContent::Contacts(contacts) => Self::contacts(recipient, contacts)?,
        };
        outgoing.context = Some(ReplyContext {
            message_id: message.context.clone(),
        });

        Ok(outgoing)
    }
}

/// One outgoing message bound to the configuration it will be sent with
#[derive(Debug, Clone)]
pub struct MessageRequest {
    pub config: ConfigSnapshot,
    pub message: OutgoingMessage,
}

impl MessageRequest {
    pub fn new(config: ConfigSnapshot, message: OutgoingMessage) -> Self {
        Self { config, message }
    }

    pub fn into_request(self, name: &'static str) -> Request<OutgoingMessage> {
        let context =
            RequestContext::phone_number(name, &self.config, &[consts::MESSAGES_ENDPOINT]);
        Request::with_body(context, Method::POST, &self.config.access_token, self.message)
    }
}

/// Read receipt for a received message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkReadRequest {
    pub messaging_product: String,
    pub status: String,
    pub message_id: String,
}

impl MarkReadRequest {
    pub fn new(message_id: &str) -> Result<Self> {
        require(message_id, "message id")?;

        Ok(Self {
            messaging_product: consts::MESSAGING_PRODUCT.to_string(),
            status: "read".to_string(),
            message_id: message_id.to_string(),
        })
    }
}

/// Response to a successful send
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResponseMessage {
    pub messaging_product: String,
    #[serde(default)]
    pub contacts: Vec<ResponseContact>,
    #[serde(default)]
    pub messages: Vec<MessageId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResponseContact {
    pub input: String,
    pub wa_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MessageId {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_status: Option<String>,
}

/// `{"success": true}` style responses
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatusResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image(id: Option<&str>, link: Option<&str>) -> MediaMessage {
        MediaMessage {
            media_type: MediaType::Image,
            media_id: id.map(str::to_string),
            media_link: link.map(str::to_string),
            caption: None,
            filename: None,
            provider: None,
        }
    }

    #[test]
    fn test_text_message_body() {
        let message = OutgoingMessage::text("255700000000", &TextMessage::new("Hello World")).unwrap();

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "255700000000",
                "type": "text",
                "text": {"body": "Hello World", "preview_url": false}
            })
        );
    }

    #[test]
    fn test_empty_recipient_or_body_is_rejected() {
        assert!(matches!(
            OutgoingMessage::text("", &TextMessage::new("hi")),
            Err(WhatsAppError::Validation(_))
        ));
        assert!(matches!(
            OutgoingMessage::text("255700000000", &TextMessage::new("  ")),
            Err(WhatsAppError::Validation(_))
        ));
    }

    #[test]
    fn test_reaction_body() {
        let message = OutgoingMessage::reaction(
            "255700000000",
            &ReactMessage {
                message_id: "wamid.X".into(),
                emoji: "\u{1F600}".into(),
            },
        )
        .unwrap();
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["type"], "reaction");
        assert_eq!(json["reaction"], json!({"message_id": "wamid.X", "emoji": "\u{1F600}"}));
    }

    #[test]
    fn test_media_requires_exactly_one_reference() {
        assert!(OutgoingMessage::media("1", &image(Some("42"), None)).is_ok());
        assert!(OutgoingMessage::media("1", &image(None, Some("https://example.com/a.png"))).is_ok());
        assert!(matches!(
            OutgoingMessage::media("1", &image(None, None)),
            Err(WhatsAppError::Validation(_))
        ));
        assert!(matches!(
            OutgoingMessage::media("1", &image(Some("42"), Some("https://example.com/a.png"))),
            Err(WhatsAppError::Validation(_))
        ));
    }

    #[test]
    fn test_media_type_selects_payload_field() {
        let document = MediaMessage {
            media_type: MediaType::Document,
            media_id: None,
            media_link: Some("https://example.com/report.pdf".into()),
            caption: Some("reporte".into()),
            filename: Some("reporte_luna.pdf".into()),
            provider: None,
        };
        let json = serde_json::to_value(OutgoingMessage::media("1", &document).unwrap()).unwrap();

        assert_eq!(json["type"], "document");
        assert_eq!(json["document"]["filename"], "reporte_luna.pdf");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_caption_and_filename_restrictions() {
        let mut sticker = image(Some("42"), None);
        sticker.media_type = MediaType::Sticker;
        sticker.caption = Some("nope".into());
        assert!(OutgoingMessage::media("1", &sticker).is_err());

        let mut picture = image(Some("42"), None);
        picture.filename = Some("cat.png".into());
        assert!(OutgoingMessage::media("1", &picture).is_err());
    }

    #[test]
    fn test_location_and_contacts_validation() {
        assert!(OutgoingMessage::location("1", &Location::new(200.0, 0.0)).is_err());
        assert!(OutgoingMessage::contacts("1", &[]).is_err());
        assert!(OutgoingMessage::contacts("1", &[Contact::new("")]).is_err());

        let json = serde_json::to_value(
            OutgoingMessage::contacts("1", &[Contact::new("John Doe")]).unwrap(),
        )
        .unwrap();
        assert_eq!(json["contacts"][0]["name"]["formatted_name"], "John Doe");
    }

    #[test]
    fn test_template_requires_name_and_language() {
        assert!(OutgoingMessage::template("1", &Template::new("", "en_US")).is_err());
        assert!(OutgoingMessage::template("1", &Template::new("hello_world", "")).is_err());

        let json = serde_json::to_value(
            OutgoingMessage::template("1", &Template::new("hello_world", "en_US")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["type"], "template");
        assert_eq!(json["template"]["language"]["code"], "en_US");
    }

    #[test]
    fn test_reply_carries_context() {
        let reply = ReplyMessage {
            context: "wamid.PREVIOUS".into(),
            content: ReplyContent::Location(Location::new(-6.8, 39.28)),
        };
        let json = serde_json::to_value(OutgoingMessage::reply("1", &reply).unwrap()).unwrap();

        assert_eq!(json["context"], json!({"message_id": "wamid.PREVIOUS"}));
        assert_eq!(json["type"], "location");
        assert_eq!(json["location"]["latitude"], -6.8);
    }

    #[test]
    fn test_reply_requires_context() {
        let reply = ReplyMessage {
            context: String::new(),
            content: ReplyContent::Text(TextMessage::new("hi")),
        };

        assert!(OutgoingMessage::reply("1", &reply).is_err());
    }

    #[test]
    fn test_message_request_addresses_messages_endpoint() {
        let config = ConfigSnapshot {
            phone_number_id: "123".into(),
            access_token: "tok".into(),
            ..Default::default()
        };
        let message = OutgoingMessage::text("1", &TextMessage::new("hi")).unwrap();
        let request = MessageRequest::new(config, message).into_request("send text");

        assert_eq!(
            request.context.url(&request.query).unwrap(),
            "https://graph.facebook.com/v16.0/123/messages"
        );
        assert_eq!(request.bearer, "tok");
        assert_eq!(request.method, Method::POST);
    }

    #[test]
    fn test_response_message_decoding() {
        let response: ResponseMessage = serde_json::from_str(
            r#"{"messaging_product":"whatsapp",
                "contacts":[{"input":"255700000000","wa_id":"255700000000"}],
                "messages":[{"id":"wamid.X"}]}"#,
        )
        .unwrap();

        assert_eq!(response.contacts.len(), 1);
        assert_eq!(response.contacts[0].wa_id, "255700000000");
        assert_eq!(response.messages[0].id, "wamid.X");
    }

    #[test]
    fn test_mark_read_body() {
        let request = MarkReadRequest::new("wamid.X").unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"messaging_product": "whatsapp", "status": "read", "message_id": "wamid.X"})
        );
        assert!(MarkReadRequest::new("").is_err());
    }
}
