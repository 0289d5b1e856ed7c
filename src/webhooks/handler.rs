//! # Notification Handler
//!
//! Walks the `messages` changes of a decoded [`Notification`] and hands every
//! message, status and value-level error to a [`NotificationHandler`]. A
//! failing handler call is logged and counted; the remaining events are still
//! delivered.

use super::schemas::{Message, Metadata, Notification, Status, WebhookError};
use async_trait::async_trait;
use tracing::{debug, error};

/// Application callbacks for inbound events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn on_message(&self, metadata: &Metadata, message: &Message) -> anyhow::Result<()>;

    async fn on_status(&self, metadata: &Metadata, status: &Status) -> anyhow::Result<()>;

    async fn on_error(&self, metadata: &Metadata, error: &WebhookError) -> anyhow::Result<()>;
}

/// Outcome of [`process_notification`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub handled: usize,
    pub failed: usize,
}

impl ProcessReport {
    fn record(&mut self, event: &str, id: &str, result: anyhow::Result<()>) {
        match result {
            Ok(()) => self.handled += 1,
            Err(err) => {
                error!("failed to handle {event} {id}: {err:#}");
                self.failed += 1;
            }
        }
    }
}

/// Delivers every event of the `messages` changes of `notification` to
/// `handler`, in payload order. Changes for other fields are skipped, the same
/// way [`Notification::messages`] skips them.
pub async fn process_notification(
    notification: &Notification,
    handler: &dyn NotificationHandler,
) -> ProcessReport {
    let mut report = ProcessReport::default();

    for change in notification.entry.iter().flat_map(|entry| &entry.changes) {
        if !change.is_messages() {
            debug!("skipping {} change", change.field);
            continue;
        }

        let value = &change.value;
        debug!(
            "processing {} change for phone number {}",
            change.field, value.metadata.phone_number_id
        );

        for message in value.messages.iter().flatten() {
            let result = handler.on_message(&value.metadata, message).await;
            report.record("message", &message.id, result);
        }

        for status in value.statuses.iter().flatten() {
            let result = handler.on_status(&value.metadata, status).await;
            report.record("status", &status.id, result);
        }

        for webhook_error in value.errors.iter().flatten() {
            let result = handler.on_error(&value.metadata, webhook_error).await;
            report.record("error", &webhook_error.code.to_string(), result);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhooks::decode_notification;

    const PAYLOAD: &str = r#"{
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA_ID",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": {"display_phone_number": "15550000000", "phone_number_id": "123"},
                    "contacts": [{"profile": {"name": "Ana"}, "wa_id": "5215512345678"}],
                    "messages": [
                        {"from": "5215512345678", "id": "wamid.A", "timestamp": "1700000000",
                         "type": "text", "text": {"body": "hola"}},
                        {"from": "5215512345678", "id": "wamid.B", "timestamp": "1700000001",
                         "type": "reaction", "reaction": {"message_id": "wamid.OUT", "emoji": "x"}}
                    ],
                    "statuses": [
                        {"id": "wamid.OUT", "status": "read", "timestamp": "1700000002",
                         "recipient_id": "5215512345678"}
                    ],
                    "errors": [{"code": 130429, "title": "Rate limit hit"}]
                }
            }]
        }]
    }"#;

    #[tokio::test]
    async fn test_every_event_is_delivered() {
        let notification = decode_notification(PAYLOAD.as_bytes()).unwrap();

        let mut handler = MockNotificationHandler::new();
        handler
            .expect_on_message()
            .withf(|metadata, _| metadata.phone_number_id == "123")
            .times(2)
            .returning(|_, _| Ok(()));
        handler
            .expect_on_status()
            .withf(|_, status| status.status == "read")
            .times(1)
            .returning(|_, _| Ok(()));
        handler
            .expect_on_error()
            .withf(|_, error| error.code == 130429)
            .times(1)
            .returning(|_, _| Ok(()));

        let report = process_notification(&notification, &handler).await;

        assert_eq!(report, ProcessReport { handled: 4, failed: 0 });
    }

    #[tokio::test]
    async fn test_handler_failure_does_not_stop_processing() {
        let notification = decode_notification(PAYLOAD.as_bytes()).unwrap();

        let mut handler = MockNotificationHandler::new();
        handler
            .expect_on_message()
            .withf(|_, message| message.id == "wamid.A")
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("database unavailable")));
        handler
            .expect_on_message()
            .withf(|_, message| message.id == "wamid.B")
            .times(1)
            .returning(|_, _| Ok(()));
        handler.expect_on_status().times(1).returning(|_, _| Ok(()));
        handler.expect_on_error().times(1).returning(|_, _| Ok(()));

        let report = process_notification(&notification, &handler).await;

        assert_eq!(report, ProcessReport { handled: 3, failed: 1 });
    }

    #[tokio::test]
    async fn test_other_fields_are_skipped() {
        let notification = decode_notification(
            br#"{"object": "whatsapp_business_account", "entry": [{"id": "WABA_ID", "changes": [{
                "field": "account_update",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": {"display_phone_number": "1", "phone_number_id": "2"},
                    "messages": [{"from": "1", "id": "wamid.A", "timestamp": "1",
                        "type": "text", "text": {"body": "x"}}],
                    "errors": [{"code": 1, "title": "ignored"}]
                }
            }]}]}"#,
        )
        .unwrap();

        let mut handler = MockNotificationHandler::new();
        handler.expect_on_message().never();
        handler.expect_on_status().never();
        handler.expect_on_error().never();

        let report = process_notification(&notification, &handler).await;

        assert_eq!(report, ProcessReport::default());
        assert!(notification.messages().is_empty());
    }

    #[tokio::test]
    async fn test_empty_notification() {
        let notification =
            decode_notification(br#"{"object":"whatsapp_business_account","entry":[]}"#).unwrap();

        let mut handler = MockNotificationHandler::new();
        handler.expect_on_message().never();
        handler.expect_on_status().never();
        handler.expect_on_error().never();

        let report = process_notification(&notification, &handler).await;

        assert_eq!(report, ProcessReport::default());
    }
}
