//! Replies to command messages.
//!
//! Replies go through the Discord REST API directly rather than the gateway
//! client so the relay core stays independent of serenity's `Context`.

use serenity::async_trait;
use tracing::info;

use crate::message::InboundMessage;
use crate::webhook::{check_status, DeliveryError, WebhookClient};

/// Sends a short text reply to the message that triggered it.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), DeliveryError>;
}

/// [`Replier`] backed by `POST /channels/{id}/messages`.
#[derive(Debug, Clone)]
pub struct DiscordReplier {
    client: WebhookClient,
    bot_token: String,
    api_base_url: String,
}

impl DiscordReplier {
    pub fn new(client: WebhookClient, bot_token: String, api_base_url: String) -> Self {
        Self {
            client,
            bot_token,
            api_base_url,
        }
    }
}

#[async_trait]
impl Replier for DiscordReplier {
    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), DeliveryError> {
        // Replies land in the exact container, i.e. inside the thread when there is one.
        let channel_id = message.container.id();
        let url = format!(
            "{}/channels/{}/messages",
            self.api_base_url.trim_end_matches('/'),
            channel_id
        );
        let request = DiscordCreateMessageRequest {
            content: text.to_string(),
            message_reference: Some(DiscordMessageReference {
                message_id: message.id.to_string(),
            }),
        };

        let response = self
            .client
            .http()
            .post(url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;

        info!(
            "reply sent to Discord channel {} for message {}",
            channel_id, message.id
        );
        Ok(())
    }
}

/// Request body for creating a Discord message.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DiscordCreateMessageRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<DiscordMessageReference>,
}

/// Message reference for replies.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DiscordMessageReference {
    pub message_id: String,
}
