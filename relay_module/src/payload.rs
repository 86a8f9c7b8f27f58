//! JSON bodies sent to the automation webhooks.
//!
//! Snowflake ids are serialized as strings so downstream JavaScript-based
//! workflow tools do not lose precision.

use chrono::SecondsFormat;
use serde::Serialize;

use crate::command::AssignAction;
use crate::message::{Attachment, Author, InboundMessage};

pub const PLATFORM: &str = "discord";

/// Normalized message forwarded to the forward endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundPayload {
    pub platform: &'static str,
    pub guild_id: Option<String>,
    /// Top-level channel, even for messages posted in a thread.
    pub channel_id: String,
    /// Thread id, `null` outside of threads.
    pub thread_id: Option<String>,
    pub message_id: String,
    pub content: String,
    pub author: AuthorPayload,
    pub attachments: Vec<AttachmentPayload>,
    pub ts: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorPayload {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentPayload {
    pub id: String,
    pub name: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Body sent to the assign endpoint for `!human` / `!bot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignRequest {
    pub action: AssignAction,
    pub channel_id: String,
    pub thread_id: Option<String>,
    /// Display name of the user who issued the command.
    pub actor: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub message_id: String,
}

impl OutboundPayload {
    pub fn from_message(message: &InboundMessage) -> Self {
        let ids = message.container.resolve();
        Self {
            platform: PLATFORM,
            guild_id: message.guild_id.map(|id| id.to_string()),
            channel_id: ids.parent_id.to_string(),
            thread_id: ids.conversation_id.map(|id| id.to_string()),
            message_id: message.id.to_string(),
            content: message.content.clone(),
            author: AuthorPayload::from(&message.author),
            attachments: message
                .attachments
                .iter()
                .map(AttachmentPayload::from)
                .collect(),
            ts: message
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl From<&Author> for AuthorPayload {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.to_string(),
            username: author.username.clone(),
            global_name: author.global_name.clone(),
        }
    }
}

impl From<&Attachment> for AttachmentPayload {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id.to_string(),
            name: attachment.name.clone(),
            url: attachment.url.clone(),
            content_type: attachment.content_type.clone(),
            size: attachment.size,
        }
    }
}

impl AssignRequest {
    pub fn new(action: AssignAction, message: &InboundMessage) -> Self {
        let ids = message.container.resolve();
        Self {
            action,
            channel_id: ids.parent_id.to_string(),
            thread_id: ids.conversation_id.map(|id| id.to_string()),
            actor: message.author.display_name().to_string(),
            author_id: message.author.id.to_string(),
            author_name: message.author.username.clone(),
            content: message.content.clone(),
            message_id: message.id.to_string(),
        }
    }
}
