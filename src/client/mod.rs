//! # WhatsApp Cloud API Client
//!
//! [`Client`] owns the runtime-mutable configuration ([`state::ClientState`])
//! and an injected [`Transport`]. Every operation takes one
//! [`state::ConfigSnapshot`] at call time, builds the request from it and
//! hands it to the dispatcher, so reconfiguring the client while requests are
//! in flight only affects requests started afterwards.
//!
//! ```no_run
//! use whatsapp_cloud::{client::Client, messages::TextMessage};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> whatsapp_cloud::errors::Result<()> {
//! let client = Client::builder()
//!     .access_token("access_token")
//!     .phone_number_id("phone_number_id")
//!     .build();
//!
//! let response = client
//!     .send_text(&CancellationToken::new(), "255700000000", &TextMessage::new("Hello World"))
//!     .await?;
//! println!("sent {}", response.messages[0].id);
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod state;

use crate::{
    consts,
    errors::{Result, WhatsAppError},
    messages::{
        MarkReadRequest, MediaMessage, MessageRequest, OutgoingMessage, ReactMessage,
        ReplyMessage, ResponseMessage, StatusResponse, TextMessage,
    },
    models::{Contact, Interactive, Location, Template},
    phone_numbers::{CodeMethod, VerificationResponse},
    qrcodes,
    transport::{ImplTransport, Method, http::ReqwestTransport},
};
use dispatch::{Request, RequestContext};
use serde::{Serialize, de::DeserializeOwned};
use state::{ClientState, ConfigSnapshot};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builder with the same defaults as [`ConfigSnapshot::default`]
#[derive(Default)]
pub struct ClientBuilder {
    /// Configuration the client starts with
    config: ConfigSnapshot,
    /// Defaults to a [`ReqwestTransport`] without timeout
    transport: Option<ImplTransport>,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config.api_version = api_version.into();
        self
    }

    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.config.access_token = access_token.into();
        self
    }

    pub fn phone_number_id(mut self, phone_number_id: impl Into<String>) -> Self {
        self.config.phone_number_id = phone_number_id.into();
        self
    }

    pub fn business_account_id(mut self, business_account_id: impl Into<String>) -> Self {
        self.config.business_account_id = business_account_id.into();
        self
    }

    /// Replaces the default reqwest transport
    pub fn transport(mut self, transport: ImplTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Client {
        Client {
            state: ClientState::new(self.config),
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::default())),
        }
    }
}

/// Client for the WhatsApp Business Cloud API. Cheap to share behind an `Arc`.
pub struct Client {
    /// Runtime-mutable configuration, read once per request
    state: ClientState,
    /// Executes the HTTP exchanges, shared by every request
    transport: ImplTransport,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Consistent copy of the current configuration
    pub fn snapshot(&self) -> ConfigSnapshot {
        self.state.snapshot()
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        self.state.set_access_token(token);
    }

    pub fn set_phone_number_id(&self, id: impl Into<String>) {
        self.state.set_phone_number_id(id);
    }

    pub fn set_business_account_id(&self, id: impl Into<String>) {
        self.state.set_business_account_id(id);
    }

    pub fn set_api_version(&self, version: impl Into<String>) {
        self.state.set_api_version(version);
    }

    pub fn set_base_url(&self, base_url: impl Into<String>) {
        self.state.set_base_url(base_url);
    }

    /// Applies several configuration changes atomically
    pub fn reconfigure(&self, apply: impl FnOnce(&mut ConfigSnapshot)) {
        self.state.update(apply);
    }

    async fn dispatch<P, T>(&self, cancel: &CancellationToken, request: Request<P>) -> Result<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        dispatch::send(self.transport.as_ref(), cancel, request).await
    }

    async fn send_message(
        &self,
        cancel: &CancellationToken,
        name: &'static str,
        build: impl FnOnce() -> Result<OutgoingMessage>,
    ) -> Result<ResponseMessage> {
        let config = self.state.snapshot();
        let message = build()?;

        self.dispatch(cancel, MessageRequest::new(config, message).into_request(name))
            .await
    }

    /// Sends a text message
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `recipient` - Recipient's WhatsApp ID (phone number with country code)
    /// * `message` - Body and link preview flag
    ///
    /// # Returns
    /// * `Result<ResponseMessage>` - Contacts and message id acknowledged by the platform
    pub async fn send_text(
        &self,
        cancel: &CancellationToken,
        recipient: &str,
        message: &TextMessage,
    ) -> Result<ResponseMessage> {
        self.send_message(cancel, "send text", || {
            OutgoingMessage::text(recipient, message)
        })
        .await
    }

    /// Reacts to a previously received message with an emoji
    ///
    /// An empty emoji removes an earlier reaction.
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `recipient` - Recipient's WhatsApp ID (phone number with country code)
    /// * `message` - Id of the reacted message and the emoji
    ///
    /// # Returns
    /// * `Result<ResponseMessage>` - Contacts and message id acknowledged by the platform
    pub async fn react(
        &self,
        cancel: &CancellationToken,
        recipient: &str,
        message: &ReactMessage,
    ) -> Result<ResponseMessage> {
        self.send_message(cancel, "react", || {
            OutgoingMessage::reaction(recipient, message)
        })
        .await
    }

    /// Sends an audio, document, image, sticker or video message
    ///
    /// The media is referenced either by an uploaded media id or by a public
    /// link, never both.
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `recipient` - Recipient's WhatsApp ID (phone number with country code)
    /// * `message` - Media type, reference, and optional caption or filename
    ///
    /// # Returns
    /// * `Result<ResponseMessage>` - Contacts and message id acknowledged by the platform
    pub async fn send_media(
        &self,
        cancel: &CancellationToken,
        recipient: &str,
        message: &MediaMessage,
    ) -> Result<ResponseMessage> {
        self.send_message(cancel, "send media", || {
            OutgoingMessage::media(recipient, message)
        })
        .await
    }

    /// Sends a location pin
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `recipient` - Recipient's WhatsApp ID (phone number with country code)
    /// * `location` - Coordinates, with optional name and address
    ///
    /// # Returns
    /// * `Result<ResponseMessage>` - Contacts and message id acknowledged by the platform
    pub async fn send_location(
        &self,
        cancel: &CancellationToken,
        recipient: &str,
        location: &Location,
    ) -> Result<ResponseMessage> {
        self.send_message(cancel, "send location", || {
            OutgoingMessage::location(recipient, location)
        })
        .await
    }

    /// Sends one or more contact cards
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `recipient` - Recipient's WhatsApp ID (phone number with country code)
    /// * `contacts` - Cards to share, each with a formatted name
    ///
    /// # Returns
    /// * `Result<ResponseMessage>` - Contacts and message id acknowledged by the platform
    pub async fn send_contacts(
        &self,
        cancel: &CancellationToken,
        recipient: &str,
        contacts: &[Contact],
    ) -> Result<ResponseMessage> {
        self.send_message(cancel, "send contacts", || {
            OutgoingMessage::contacts(recipient, contacts)
        })
        .await
    }

    /// Sends a pre-approved message template
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `recipient` - Recipient's WhatsApp ID (phone number with country code)
    /// * `template` - Template name, language and component parameters
    ///
    /// # Returns
    /// * `Result<ResponseMessage>` - Contacts and message id acknowledged by the platform
    pub async fn send_template(
        &self,
        cancel: &CancellationToken,
        recipient: &str,
        template: &Template,
    ) -> Result<ResponseMessage> {
        self.send_message(cancel, "send template", || {
            OutgoingMessage::template(recipient, template)
        })
        .await
    }

    /// Sends an interactive list or reply-button message
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `recipient` - Recipient's WhatsApp ID (phone number with country code)
    /// * `interactive` - List (1 to 10 rows) or buttons (1 to 3)
    ///
    /// # Returns
    /// * `Result<ResponseMessage>` - Contacts and message id acknowledged by the platform
    pub async fn send_interactive(
        &self,
        cancel: &CancellationToken,
        recipient: &str,
        interactive: &Interactive,
    ) -> Result<ResponseMessage> {
        self.send_message(cancel, "send interactive", || {
            OutgoingMessage::interactive(recipient, interactive)
        })
        .await
    }

    /// Replies to a received message, quoting it in the conversation
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `recipient` - Recipient's WhatsApp ID (phone number with country code)
    /// * `message` - Id of the quoted message and the reply content
    ///
    /// # Returns
    /// * `Result<ResponseMessage>` - Contacts and message id acknowledged by the platform
    pub async fn reply(
        &self,
        cancel: &CancellationToken,
        recipient: &str,
        message: &ReplyMessage,
    ) -> Result<ResponseMessage> {
        self.send_message(cancel, "reply", || OutgoingMessage::reply(recipient, message))
            .await
    }

    /// Marks a received message as read
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `message_id` - Id of the received message (`wamid...`)
    ///
    /// # Returns
    /// * `Result<StatusResponse>` - `success` as reported by the platform
    pub async fn mark_message_read(
        &self,
        cancel: &CancellationToken,
        message_id: &str,
    ) -> Result<StatusResponse> {
        let config = self.state.snapshot();
        let body = MarkReadRequest::new(message_id)?;
        let context =
            RequestContext::phone_number("mark read", &config, &[consts::MESSAGES_ENDPOINT]);

        self.dispatch(
            cancel,
            Request::with_body(context, Method::POST, &config.access_token, body),
        )
        .await
    }

    /// Creates a QR code opening a chat prefilled with a message
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `request` - Prefilled message and the image format to render
    ///
    /// # Returns
    /// * `Result<qrcodes::CreateResponse>` - Code, deep link and image url
    pub async fn create_qr_code(
        &self,
        cancel: &CancellationToken,
        request: &qrcodes::CreateRequest,
    ) -> Result<qrcodes::CreateResponse> {
        if request.prefilled_message.trim().is_empty() {
            return Err(WhatsAppError::Validation(
                "qr code prefilled message is required".into(),
            ));
        }

        let config = self.state.snapshot();
        let context =
            RequestContext::phone_number("create qr code", &config, &[consts::QR_CODES_ENDPOINT]);
        let request = Request::without_body(context, Method::POST, &config.access_token)
            .query("prefilled_message", request.prefilled_message.as_str())
            .query("generate_qr_image", request.image_format.to_string());

        self.dispatch(cancel, request).await
    }

    /// Lists the QR codes of the phone number
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    ///
    /// # Returns
    /// * `Result<qrcodes::ListResponse>` - Every code with its prefilled message
    pub async fn list_qr_codes(
        &self,
        cancel: &CancellationToken,
    ) -> Result<qrcodes::ListResponse> {
        let config = self.state.snapshot();
        let context =
            RequestContext::phone_number("list qr codes", &config, &[consts::QR_CODES_ENDPOINT]);

        self.dispatch(
            cancel,
            Request::without_body(context, Method::GET, &config.access_token),
        )
        .await
    }

    /// Fetches a single QR code
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `qr_code_id` - Code returned on creation
    ///
    /// # Returns
    /// * `Result<qrcodes::Information>` - The code, or a decode error when the
    ///   platform answers without it
    pub async fn get_qr_code(
        &self,
        cancel: &CancellationToken,
        qr_code_id: &str,
    ) -> Result<qrcodes::Information> {
        let config = self.state.snapshot();
        let context = RequestContext::phone_number(
            "get qr code",
            &config,
            &[consts::QR_CODES_ENDPOINT, qr_code_id],
        );

        let response: qrcodes::ListResponse = self
            .dispatch(
                cancel,
                Request::without_body(context, Method::GET, &config.access_token),
            )
            .await?;

        response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| WhatsAppError::Decode {
                message: format!("qr code {qr_code_id} missing from response"),
                fragment: String::new(),
            })
    }

    /// Changes the prefilled message of a QR code
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `qr_code_id` - Code returned on creation
    /// * `request` - New prefilled message; the image format is ignored
    ///
    /// # Returns
    /// * `Result<qrcodes::SuccessResponse>` - `success` as reported by the platform
    pub async fn update_qr_code(
        &self,
        cancel: &CancellationToken,
        qr_code_id: &str,
        request: &qrcodes::CreateRequest,
    ) -> Result<qrcodes::SuccessResponse> {
        let config = self.state.snapshot();
        let context = RequestContext::phone_number(
            "update qr code",
            &config,
            &[consts::QR_CODES_ENDPOINT, qr_code_id],
        );
        let request = Request::without_body(context, Method::POST, &config.access_token)
            .query("prefilled_message", request.prefilled_message.as_str());

        self.dispatch(cancel, request).await
    }

    /// Deletes a QR code
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `qr_code_id` - Code returned on creation
    ///
    /// # Returns
    /// * `Result<qrcodes::SuccessResponse>` - `success` as reported by the platform
    pub async fn delete_qr_code(
        &self,
        cancel: &CancellationToken,
        qr_code_id: &str,
    ) -> Result<qrcodes::SuccessResponse> {
        let config = self.state.snapshot();
        let context = RequestContext::phone_number(
            "delete qr code",
            &config,
            &[consts::QR_CODES_ENDPOINT, qr_code_id],
        );

        self.dispatch(
            cancel,
            Request::without_body(context, Method::DELETE, &config.access_token),
        )
        .await
    }

    /// Asks the platform to deliver a registration code to the phone number
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `code_method` - SMS or voice call
    /// * `language` - Language of the delivered message, e.g. `en_US`
    ///
    /// # Returns
    /// * `Result<VerificationResponse>` - `success` as reported by the platform
    pub async fn request_verification_code(
        &self,
        cancel: &CancellationToken,
        code_method: CodeMethod,
        language: &str,
    ) -> Result<VerificationResponse> {
        let config = self.state.snapshot();
        let context = RequestContext::phone_number(
            "request verification code",
            &config,
            &[consts::REQUEST_CODE_ENDPOINT],
        );
        let request = Request::without_body(context, Method::POST, &config.access_token)
            .query("code_method", code_method.to_string())
            .query("language", language);

        self.dispatch(cancel, request).await
    }

    /// Submits the registration code received by the phone number
    ///
    /// # Arguments
    /// * `cancel` - Cancels the request while it is in flight
    /// * `code` - Code received by SMS or voice call
    ///
    /// # Returns
    /// * `Result<VerificationResponse>` - `success` as reported by the platform
    pub async fn verify_code(
        &self,
        cancel: &CancellationToken,
        code: &str,
    ) -> Result<VerificationResponse> {
        if code.trim().is_empty() {
            return Err(WhatsAppError::Validation("verification code is required".into()));
        }

        let config = self.state.snapshot();
        let context = RequestContext::phone_number(
            "verify code",
            &config,
            &[consts::VERIFY_CODE_ENDPOINT],
        );
        let request = Request::without_body(context, Method::POST, &config.access_token)
            .query("code", code);

        self.dispatch(cancel, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::MediaType,
        transport::{MockTransport, TransportResponse},
    };
    use serde_json::json;

    fn client_with(transport: MockTransport) -> Client {
        Client::builder()
            .base_url("https://graph.facebook.com/")
            .api_version("v16.0")
            .phone_number_id("123")
            .access_token("tok")
            .transport(Arc::new(transport))
            .build()
    }

    fn ok(body: &str) -> anyhow::Result<TransportResponse> {
        Ok(TransportResponse {
            status: 200,
            body: body.as_bytes().to_vec(),
        })
    }

    const SEND_OK: &str = r#"{"messaging_product":"whatsapp",
        "contacts":[{"input":"255700000000","wa_id":"255700000000"}],
        "messages":[{"id":"wamid.X"}]}"#;

    fn body_json(body: &Option<Vec<u8>>) -> serde_json::Value {
        serde_json::from_slice(body.as_deref().unwrap_or_default()).unwrap_or_default()
    }

    #[test]
    fn test_builder_defaults() {
        let client = Client::builder().build();
        let config = client.snapshot();

        assert_eq!(config.base_url, consts::BASE_URL);
        assert_eq!(config.api_version, consts::LOWEST_SUPPORTED_VERSION);
        assert!(config.access_token.is_empty());
        assert!(config.phone_number_id.is_empty());
        assert!(config.business_account_id.is_empty());
    }

    #[tokio::test]
    async fn test_send_text_message() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| {
                let body = body_json(&request.body);
                request.method == Method::POST
                    && request.url == "https://graph.facebook.com/v16.0/123/messages"
                    && request.header("Authorization") == Some("Bearer tok")
                    && body["type"] == "text"
                    && body["text"] == json!({"body": "Hello World", "preview_url": false})
            })
            .times(1)
            .returning(|_| ok(SEND_OK));

        let client = client_with(transport);
        let response = client
            .send_text(
                &CancellationToken::new(),
                "255700000000",
                &TextMessage::new("Hello World"),
            )
            .await
            .unwrap();

        assert_eq!(response.messaging_product, "whatsapp");
        assert_eq!(response.contacts.len(), 1);
        assert_eq!(response.contacts[0].input, "255700000000");
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].id, "wamid.X");
    }

    #[tokio::test]
    async fn test_platform_error_is_api_error() {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(1).returning(|_| {
            Ok(TransportResponse {
                status: 400,
                body: br#"{"error":{"code":131, "title":"X","message":"Y"}}"#.to_vec(),
            })
        });

        let client = client_with(transport);
        let result = client
            .send_text(&CancellationToken::new(), "255700000000", &TextMessage::new("hi"))
            .await;

        match result {
            Err(WhatsAppError::Api(api_error)) => {
                assert_eq!(api_error.code, 131);
                assert_eq!(api_error.title, "X");
                assert_eq!(api_error.details, "Y");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validation_error_skips_transport() {
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        let client = client_with(transport);
        let message = MediaMessage {
            media_type: MediaType::Image,
            media_id: None,
            media_link: None,
            caption: None,
            filename: None,
            provider: None,
        };
        let result = client
            .send_media(&CancellationToken::new(), "255700000000", &message)
            .await;

        assert!(matches!(result, Err(WhatsAppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rotated_token_applies_to_next_request() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| request.header("Authorization") == Some("Bearer tok"))
            .times(1)
            .returning(|_| ok(SEND_OK));
        transport
            .expect_execute()
            .withf(|request| {
                request.header("Authorization") == Some("Bearer rotated")
                    && request.url == "https://graph.facebook.com/v16.0/456/messages"
            })
            .times(1)
            .returning(|_| ok(SEND_OK));

        let client = client_with(transport);
        let cancel = CancellationToken::new();

        client
            .send_text(&cancel, "255700000000", &TextMessage::new("first"))
            .await
            .unwrap();

        client.reconfigure(|config| {
            config.access_token = "rotated".into();
            config.phone_number_id = "456".into();
        });

        client
            .send_text(&cancel, "255700000000", &TextMessage::new("second"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_message_read() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| {
                body_json(&request.body)
                    == json!({"messaging_product": "whatsapp", "status": "read", "message_id": "wamid.X"})
            })
            .times(1)
            .returning(|_| ok(r#"{"success":true}"#));

        let client = client_with(transport);
        let response = client
            .mark_message_read(&CancellationToken::new(), "wamid.X")
            .await
            .unwrap();

        assert!(response.success);
    }

    #[tokio::test]
    async fn test_create_qr_code_uses_query_parameters() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| {
                request.method == Method::POST
                    && request.url
                        == "https://graph.facebook.com/v16.0/123/message_qrdls?prefilled_message=Cyber+Monday&generate_qr_image=PNG"
                    && request.body.is_none()
            })
            .times(1)
            .returning(|_| {
                ok(r#"{"code":"4O4YGZEG3RIVE1","prefilled_message":"Cyber Monday",
                    "deep_link_url":"https://wa.me/message/4O4YGZEG3RIVE1",
                    "qr_image_url":"https://scontent.example/qr.png"}"#)
            });

        let client = client_with(transport);
        let response = client
            .create_qr_code(
                &CancellationToken::new(),
                &qrcodes::CreateRequest::new("Cyber Monday", qrcodes::ImageFormat::Png),
            )
            .await
            .unwrap();

        assert_eq!(response.code, "4O4YGZEG3RIVE1");
        assert!(response.qr_image_url.is_some());
    }

    #[tokio::test]
    async fn test_get_qr_code_picks_first_entry() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| {
                request.method == Method::GET
                    && request.url
                        == "https://graph.facebook.com/v16.0/123/message_qrdls/4O4YGZEG3RIVE1"
            })
            .times(1)
            .returning(|_| {
                ok(r#"{"data":[{"code":"4O4YGZEG3RIVE1","prefilled_message":"Cyber Monday",
                    "deep_link_url":"https://wa.me/message/4O4YGZEG3RIVE1"}]}"#)
            });

        let client = client_with(transport);
        let info = client
            .get_qr_code(&CancellationToken::new(), "4O4YGZEG3RIVE1")
            .await
            .unwrap();

        assert_eq!(info.prefilled_message, "Cyber Monday");
    }

    #[tokio::test]
    async fn test_get_qr_code_missing_entry() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| ok(r#"{"data":[]}"#));

        let client = client_with(transport);
        let result = client
            .get_qr_code(&CancellationToken::new(), "UNKNOWN")
            .await;

        assert!(matches!(result, Err(WhatsAppError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_delete_qr_code() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| request.method == Method::DELETE)
            .times(1)
            .returning(|_| ok(r#"{"success":true}"#));

        let client = client_with(transport);
        let response = client
            .delete_qr_code(&CancellationToken::new(), "4O4YGZEG3RIVE1")
            .await
            .unwrap();

        assert!(response.success);
    }

    #[tokio::test]
    async fn test_request_verification_code() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| {
                request.url
                    == "https://graph.facebook.com/v16.0/123/request_code?code_method=SMS&language=en_US"
            })
            .times(1)
            .returning(|_| ok(r#"{"success":true}"#));

        let client = client_with(transport);
        let response = client
            .request_verification_code(&CancellationToken::new(), CodeMethod::Sms, "en_US")
            .await
            .unwrap();

        assert!(response.success);
    }

    #[tokio::test]
    async fn test_verify_code_requires_code() {
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        let client = client_with(transport);
        let result = client.verify_code(&CancellationToken::new(), " ").await;

        assert!(matches!(result, Err(WhatsAppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cancelled_send_surfaces_cancellation() {
        let mut transport = MockTransport::new();
        transport.expect_execute().never();

        let client = client_with(transport);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = client
            .send_text(&cancel, "255700000000", &TextMessage::new("hi"))
            .await;

        assert!(result.is_err_and(|err| err.is_cancelled()));
    }

    #[tokio::test]
    async fn test_concurrent_sends_share_client() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(8)
            .returning(|_| ok(SEND_OK));

        let client = Arc::new(client_with(transport));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = Arc::clone(&client);
                tokio::spawn(async move {
                    client
                        .send_text(
                            &CancellationToken::new(),
                            "255700000000",
                            &TextMessage::new(format!("message {i}")),
                        )
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
