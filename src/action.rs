use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use envconfig::Envconfig;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use whatsapp_cloud::{
    Client,
    config::ClientConfig,
    messages::{ReactMessage, TextMessage},
    webhooks::{self, schemas::MessageContent},
};

#[derive(Args, Debug, Clone)]
pub struct SendTextArgs {
    /// Recipient phone number, international format without `+`
    #[arg(short, long)]
    to: String,
    #[arg(short, long)]
    body: String,
    /// Render a preview for the first url in the body
    #[arg(long, default_value_t = false)]
    preview_url: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReactArgs {
    #[arg(short, long)]
    to: String,
    #[arg(short, long)]
    message_id: String,
    /// Leave empty to remove a previous reaction
    #[arg(short, long, default_value = "")]
    emoji: String,
}

#[derive(Args, Debug, Clone)]
pub struct MarkReadArgs {
    #[arg(short, long)]
    message_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeWebhookArgs {
    /// File holding a notification body as received by the webhook endpoint
    #[arg(short, long)]
    file: PathBuf,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    SendText(SendTextArgs),
    React(ReactArgs),
    MarkRead(MarkReadArgs),
    DecodeWebhook(DecodeWebhookArgs),
}

/// WhatsApp Cloud API command line client.
/// Reads its settings from the WHATSAPP_* environment variables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub action: Action,
}

fn client_from_env() -> anyhow::Result<Client> {
    let config = ClientConfig::init_from_env().context("invalid WHATSAPP_* environment")?;

    Ok(config.client_builder()?.build())
}

/// Token cancelled on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling request");
            trigger.cancel();
        }
    });

    cancel
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.action {
            Action::SendText(SendTextArgs {
                to,
                body,
                preview_url,
            }) => {
                let client = client_from_env()?;
                let message = TextMessage {
                    body: body.clone(),
                    preview_url: *preview_url,
                };

                let response = client
                    .send_text(&cancel_on_ctrl_c(), to, &message)
                    .await?;
                for sent in &response.messages {
                    info!("sent message {}", sent.id);
                }
                Ok(())
            }
            Action::React(ReactArgs {
                to,
                message_id,
                emoji,
            }) => {
                let client = client_from_env()?;
                let reaction = ReactMessage {
                    message_id: message_id.clone(),
                    emoji: emoji.clone(),
                };

                client.react(&cancel_on_ctrl_c(), to, &reaction).await?;
                Ok(())
            }
            Action::MarkRead(MarkReadArgs { message_id }) => {
                let client = client_from_env()?;

                let response = client
                    .mark_message_read(&cancel_on_ctrl_c(), message_id)
                    .await?;
                info!("message {message_id} marked read: {}", response.success);
                Ok(())
            }
            Action::DecodeWebhook(DecodeWebhookArgs { file }) => {
                let body = std::fs::read(file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let notification = webhooks::decode_notification(&body)?;

                for message in notification.messages() {
                    println!("{}", summarize(message));
                }
                for status in notification.statuses() {
                    println!(
                        "status {} {} for {}",
                        status.id, status.status, status.recipient_id
                    );
                }
                Ok(())
            }
        }
    }
}

fn summarize(message: &webhooks::schemas::Message) -> String {
    let sent_at = message
        .sent_at()
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| message.timestamp.clone());
    let detail = match &message.content {
        MessageContent::Text(text) => text.body.clone(),
        MessageContent::Reaction(reaction) => {
            format!("{} on {}", reaction.emoji, reaction.message_id)
        }
        MessageContent::Location(location) => {
            format!("{}, {}", location.latitude, location.longitude)
        }
        MessageContent::Contacts(contacts) => format!("{} contact(s)", contacts.len()),
        MessageContent::Audio(media)
        | MessageContent::Document(media)
        | MessageContent::Image(media)
        | MessageContent::Sticker(media)
        | MessageContent::Video(media) => format!("media {}", media.id),
        MessageContent::Interactive(reply) => reply.selected_id().unwrap_or_default().to_string(),
        MessageContent::Button(button) => button.payload.clone(),
        MessageContent::Other(_) => message
            .errors
            .iter()
            .flatten()
            .map(|error| error.details().to_string())
            .collect::<Vec<_>>()
            .join("; "),
    };

    format!(
        "{sent_at} {kind} from {from} ({id}): {detail}",
        kind = message.kind(),
        from = message.from,
        id = message.id
    )
}
