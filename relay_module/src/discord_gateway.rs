//! Discord Gateway client for receiving messages via WebSocket.
//!
//! This module provides a serenity-based event handler that connects to Discord's
//! Gateway WebSocket, converts incoming messages to [`InboundMessage`] and hands
//! them to the [`Relay`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serenity::all::{Context, EventHandler, GatewayIntents, Ready};
use serenity::async_trait;
use serenity::model::channel::{Channel, ChannelType, Message};
use serenity::Client;
use tracing::{debug, error, info, warn};

use crate::container::Container;
use crate::message::{Attachment, Author, InboundMessage};
use crate::relay::{HandleOutcome, Relay};
use crate::reply::DiscordReplier;

/// Serenity event handler for Discord Gateway events.
pub struct DiscordEventHandler {
    relay: Arc<Relay>,
    replier: DiscordReplier,
}

impl DiscordEventHandler {
    pub fn new(relay: Arc<Relay>) -> Self {
        let config = relay.config();
        let replier = DiscordReplier::new(
            relay.webhooks().clone(),
            config.discord_token.clone(),
            config.discord_api_base_url.clone(),
        );
        Self { relay, replier }
    }
}

#[async_trait]
impl EventHandler for DiscordEventHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        let allowlist = &self.relay.config().allowlist;
        if allowlist.is_empty() {
            info!(
                "Discord bot connected as {}, listening on all channels",
                ready.user.name
            );
        } else {
            info!(
                "Discord bot connected as {}, listening on channels {:?}",
                ready.user.name,
                allowlist.ids()
            );
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Cheap pre-check so bot chatter never costs a channel lookup.
        if msg.author.bot {
            return;
        }

        let container = resolve_container(&ctx, &msg).await;
        let inbound = inbound_from_serenity(&msg, container);

        let handled = AssertUnwindSafe(self.relay.handle(&inbound, &self.replier))
            .catch_unwind()
            .await;
        match handled {
            Ok(HandleOutcome::Ignored(reason)) => {
                debug!("message {} ignored: {:?}", inbound.id, reason);
            }
            Ok(outcome) => {
                debug!("message {} handled: {:?}", inbound.id, outcome);
            }
            Err(_) => {
                error!("relay handler panicked on message {}", inbound.id);
            }
        }
    }
}

/// Classify the message's channel as a plain channel or a thread.
///
/// The gateway cache is consulted first (channels, then active threads); REST is
/// only used when the cache has no entry. Lookup failures degrade to a plain
/// channel so forwarding is never blocked.
async fn resolve_container(ctx: &Context, msg: &Message) -> Container {
    let channel_id = msg.channel_id.get();
    if let Some(container) = cached_container(ctx, msg) {
        return container;
    }

    debug!("channel {} not in cache, fetching it", channel_id);
    match ctx.http.get_channel(msg.channel_id).await {
        Ok(Channel::Guild(channel)) => container_from_kind(
            channel_id,
            channel.kind,
            channel.parent_id.map(|id| id.get()),
        ),
        Ok(_) => Container::Channel { id: channel_id },
        Err(err) => {
            warn!(
                "failed to look up Discord channel {}, treating it as a plain channel: {}",
                channel_id, err
            );
            Container::Channel { id: channel_id }
        }
    }
}

/// Cache-only classification. `None` means the cache cannot tell.
fn cached_container(ctx: &Context, msg: &Message) -> Option<Container> {
    let channel_id = msg.channel_id.get();
    let Some(guild_id) = msg.guild_id else {
        return Some(Container::Channel { id: channel_id });
    };
    // The guild guard must not live across an await.
    let guild = ctx.cache.guild(guild_id)?;
    let found = classify_cached(
        channel_id,
        guild
            .channels
            .values()
            .chain(guild.threads.iter())
            .map(|c| (c.id.get(), c.kind, c.parent_id.map(|id| id.get()))),
    );
    found
}

/// Find `channel_id` among known `(id, kind, parent_id)` entries.
pub fn classify_cached(
    channel_id: u64,
    known: impl IntoIterator<Item = (u64, ChannelType, Option<u64>)>,
) -> Option<Container> {
    known
        .into_iter()
        .find(|(id, _, _)| *id == channel_id)
        .map(|(id, kind, parent_id)| container_from_kind(id, kind, parent_id))
}

pub fn container_from_kind(id: u64, kind: ChannelType, parent_id: Option<u64>) -> Container {
    match kind {
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread => {
            Container::Thread { id, parent_id }
        }
        _ => Container::Channel { id },
    }
}

/// Convert a serenity Message to a normalized [`InboundMessage`].
pub fn inbound_from_serenity(message: &Message, container: Container) -> InboundMessage {
    let created_at = match DateTime::parse_from_rfc3339(&message.timestamp.to_string()) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(err) => {
            warn!(
                "unparseable timestamp on message {}, using receive time: {}",
                message.id, err
            );
            Utc::now()
        }
    };

    InboundMessage {
        id: message.id.get(),
        content: message.content.clone(),
        author: Author {
            id: message.author.id.get(),
            username: message.author.name.clone(),
            global_name: message.author.global_name.clone(),
            bot: message.author.bot,
        },
        container,
        guild_id: message.guild_id.map(|id| id.get()),
        created_at,
        attachments: message
            .attachments
            .iter()
            .map(|a| Attachment {
                id: a.id.get(),
                name: a.filename.clone(),
                url: a.url.clone(),
                content_type: a.content_type.clone(),
                size: u64::from(a.size),
            })
            .collect(),
    }
}

/// Create and start the Discord Gateway client.
///
/// Runs until the gateway connection ends for good; serenity handles
/// reconnects internally.
pub async fn start_discord_client(relay: Arc<Relay>) -> Result<(), serenity::Error> {
    // Message content is a privileged intent; without it `content` arrives empty.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let token = relay.config().discord_token.clone();
    let handler = DiscordEventHandler::new(relay);

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    info!("Starting Discord Gateway client...");
    client.start().await
}
