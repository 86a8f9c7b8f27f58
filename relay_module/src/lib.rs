pub mod command;
pub mod config;
pub mod container;
pub mod discord_gateway;
pub mod message;
pub mod payload;
pub mod relay;
pub mod reply;
pub mod server;
pub mod webhook;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use command::{parse_command, AssignAction, CommandScope};
pub use config::{ConfigError, RelayConfig};
pub use container::{Allowlist, AllowlistError, Container, ResolvedIds};
pub use message::{Attachment, Author, InboundMessage};
pub use payload::{AssignRequest, OutboundPayload};
pub use relay::{CommandOutcome, HandleOutcome, IgnoreReason, Relay};
pub use reply::{DiscordReplier, Replier};
pub use webhook::{DeliveryError, WebhookClient};
