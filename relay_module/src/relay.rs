//! Per-message relay logic: filter, command handling, forwarding.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::command::{parse_command, AssignAction, CommandScope};
use crate::config::RelayConfig;
use crate::message::InboundMessage;
use crate::payload::{AssignRequest, OutboundPayload};
use crate::reply::Replier;
use crate::webhook::WebhookClient;

const REPLY_NOT_CONFIGURED: &str =
    "Assignment is not configured for this relay (ASSIGN_URL is not set).";
const REPLY_THREAD_ONLY: &str =
    "Please use `!human` or `!bot` inside the conversation thread you want to reassign.";
const REPLY_FAILED: &str = "Sorry, the assignment could not be updated. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Container is outside the configured allowlist.
    NotAllowed,
    /// Message was written by a bot account (including this relay).
    BotAuthor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    NotConfigured,
    OutsideThread,
    Assigned(AssignAction),
    AssignFailed(AssignAction),
}

/// What happened to a single inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    Ignored(IgnoreReason),
    Forwarded,
    ForwardFailed,
    /// No forward webhook configured; payload was only logged.
    DryRun,
    Command(CommandOutcome),
}

/// Shared, read-only relay state. One instance serves every event handler task.
#[derive(Debug, Clone)]
pub struct Relay {
    config: Arc<RelayConfig>,
    webhooks: WebhookClient,
}

impl Relay {
    pub fn new(config: Arc<RelayConfig>) -> Self {
        let webhooks = WebhookClient::new(config.request_timeout);
        Self { config, webhooks }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn webhooks(&self) -> &WebhookClient {
        &self.webhooks
    }

    /// Process one message. Delivery and reply failures are logged here and
    /// never returned as errors.
    pub async fn handle(&self, message: &InboundMessage, replier: &dyn Replier) -> HandleOutcome {
        if !self.config.allowlist.is_allowed(&message.container) {
            return HandleOutcome::Ignored(IgnoreReason::NotAllowed);
        }

        if message.author.bot {
            debug!("ignoring bot message {}", message.id);
            return HandleOutcome::Ignored(IgnoreReason::BotAuthor);
        }

        if let Some(action) = parse_command(&message.content) {
            return HandleOutcome::Command(self.handle_command(action, message, replier).await);
        }

        self.forward(message).await
    }

    async fn handle_command(
        &self,
        action: AssignAction,
        message: &InboundMessage,
        replier: &dyn Replier,
    ) -> CommandOutcome {
        info!(
            "assignment command !{} from {} in container {}",
            action,
            message.author.id,
            message.container.id()
        );

        let Some(assign_url) = self.config.assign_url.as_deref() else {
            warn!("assignment command received but ASSIGN_URL is not set");
            reply_best_effort(replier, message, REPLY_NOT_CONFIGURED).await;
            return CommandOutcome::NotConfigured;
        };

        if self.config.command_scope == CommandScope::ThreadOnly && !message.container.is_thread() {
            reply_best_effort(replier, message, REPLY_THREAD_ONLY).await;
            return CommandOutcome::OutsideThread;
        }

        let request = AssignRequest::new(action, message);
        match self.webhooks.post_json(assign_url, &request).await {
            Ok(status) => {
                info!(
                    "assigned channel={} thread={:?} to {} → {}",
                    request.channel_id, request.thread_id, action, status
                );
                reply_best_effort(replier, message, &assigned_reply(action)).await;
                CommandOutcome::Assigned(action)
            }
            Err(err) => {
                error!(
                    "assign call failed channel={} thread={:?}: {}",
                    request.channel_id, request.thread_id, err
                );
                reply_best_effort(replier, message, REPLY_FAILED).await;
                CommandOutcome::AssignFailed(action)
            }
        }
    }

    async fn forward(&self, message: &InboundMessage) -> HandleOutcome {
        let payload = OutboundPayload::from_message(message);

        let Some(forward_url) = self.config.forward_url.as_deref() else {
            match serde_json::to_string(&payload) {
                Ok(json) => info!("dry run, would forward: {}", json),
                Err(err) => warn!("dry run, failed to serialize payload: {}", err),
            }
            return HandleOutcome::DryRun;
        };

        match self.webhooks.post_json(forward_url, &payload).await {
            Ok(status) => {
                info!(
                    "forwarded message {} (channel={} thread={:?} len={} attachments={}) → {}",
                    payload.message_id,
                    payload.channel_id,
                    payload.thread_id,
                    payload.content.len(),
                    payload.attachments.len(),
                    status
                );
                HandleOutcome::Forwarded
            }
            Err(err) => {
                error!("forward failed for message {}: {}", payload.message_id, err);
                HandleOutcome::ForwardFailed
            }
        }
    }
}

fn assigned_reply(action: AssignAction) -> String {
    match action {
        AssignAction::Human => "Got it, a human will take over this conversation.".to_string(),
        AssignAction::Bot => "Got it, the bot is handling this conversation again.".to_string(),
    }
}

async fn reply_best_effort(replier: &dyn Replier, message: &InboundMessage, text: &str) {
    if let Err(err) = replier.reply(message, text).await {
        warn!("failed to reply to message {}: {}", message.id, err);
    }
}
