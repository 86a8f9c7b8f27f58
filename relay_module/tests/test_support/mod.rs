#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use relay_module::{
    Allowlist, Author, CommandScope, Container, DeliveryError, InboundMessage, Relay,
    RelayConfig, Replier,
};
use serenity::async_trait;

pub const CHANNEL_C1: u64 = 1001;
pub const THREAD_T1: u64 = 2001;

pub fn test_config(forward_url: Option<String>, assign_url: Option<String>) -> RelayConfig {
    RelayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        discord_token: "test-token".to_string(),
        forward_url,
        assign_url,
        allowlist: Allowlist::default(),
        command_scope: CommandScope::AnyContainer,
        dry_run: false,
        request_timeout: Duration::from_secs(5),
        discord_api_base_url: "http://127.0.0.1:1".to_string(),
    }
}

pub fn relay_with(config: RelayConfig) -> Relay {
    Relay::new(Arc::new(config))
}

pub fn message(id: u64, content: &str, container: Container) -> InboundMessage {
    InboundMessage {
        id,
        content: content.to_string(),
        author: Author {
            id: 42,
            username: "alice".to_string(),
            global_name: Some("Alice".to_string()),
            bot: false,
        },
        container,
        guild_id: Some(9000),
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        attachments: Vec::new(),
    }
}

pub fn in_channel(id: u64, content: &str) -> InboundMessage {
    message(id, content, Container::Channel { id: CHANNEL_C1 })
}

pub fn in_thread(id: u64, content: &str) -> InboundMessage {
    message(
        id,
        content,
        Container::Thread {
            id: THREAD_T1,
            parent_id: Some(CHANNEL_C1),
        },
    )
}

/// Replier that records reply texts instead of calling Discord.
#[derive(Default)]
pub struct RecordingReplier {
    replies: Mutex<Vec<(u64, String)>>,
}

impl RecordingReplier {
    pub fn replies(&self) -> Vec<(u64, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Replier for RecordingReplier {
    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), DeliveryError> {
        self.replies
            .lock()
            .unwrap()
            .push((message.id, text.to_string()));
        Ok(())
    }
}

/// Replier whose every attempt fails with a timeout.
pub struct FailingReplier;

#[async_trait]
impl Replier for FailingReplier {
    async fn reply(&self, _message: &InboundMessage, _text: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::Timeout)
    }
}
