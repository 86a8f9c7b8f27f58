//! Platform-neutral view of an inbound Discord message.

use chrono::{DateTime, Utc};

use crate::container::Container;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub username: String,
    pub global_name: Option<String>,
    pub bot: bool,
}

impl Author {
    /// Name shown to other users: the global display name, else the username.
    pub fn display_name(&self) -> &str {
        self.global_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Attachment metadata. Content is never downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: u64,
    pub content: String,
    pub author: Author,
    pub container: Container,
    pub guild_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(global_name: Option<&str>) -> Author {
        Author {
            id: 1,
            username: "alice".to_string(),
            global_name: global_name.map(str::to_string),
            bot: false,
        }
    }

    #[test]
    fn display_name_prefers_global_name() {
        assert_eq!(author(Some("Alice A.")).display_name(), "Alice A.");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(author(None).display_name(), "alice");
        assert_eq!(author(Some("  ")).display_name(), "alice");
    }
}
