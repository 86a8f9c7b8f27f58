//! Conversation containers and the channel allowlist.
//!
//! Discord threads live in the same id-space as channels. A message posted in
//! a thread is attributed to its parent channel for routing purposes, while the
//! thread id itself identifies the specific conversation.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllowlistError {
    #[error("invalid channel id '{0}'")]
    InvalidId(String),
}

/// A conversation surface a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Top-level text channel (or DM channel).
    Channel { id: u64 },
    /// Thread nested under a parent channel. `parent_id` is `None` when the
    /// platform did not report one.
    Thread { id: u64, parent_id: Option<u64> },
}

/// Routing identifiers derived from a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedIds {
    /// Top-level container, stable for every message of a conversation.
    pub parent_id: u64,
    /// The thread id, or `None` outside of threads.
    pub conversation_id: Option<u64>,
}

impl Container {
    /// Raw id of the container the message was posted in.
    pub fn id(&self) -> u64 {
        match self {
            Container::Channel { id } | Container::Thread { id, .. } => *id,
        }
    }

    pub fn is_thread(&self) -> bool {
        matches!(self, Container::Thread { .. })
    }

    /// Derive `(parent_id, conversation_id)`.
    ///
    /// A thread with an unknown parent resolves to itself as parent.
    pub fn resolve(&self) -> ResolvedIds {
        match *self {
            Container::Channel { id } => ResolvedIds {
                parent_id: id,
                conversation_id: None,
            },
            Container::Thread { id, parent_id } => ResolvedIds {
                parent_id: parent_id.unwrap_or(id),
                conversation_id: Some(id),
            },
        }
    }
}

/// Set of container ids the relay listens on. Empty means every container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    ids: HashSet<u64>,
}

impl Allowlist {
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list of snowflake ids, skipping blanks.
    pub fn parse(raw: &str) -> Result<Self, AllowlistError> {
        let mut ids = HashSet::new();
        for part in raw.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let id = trimmed
                .parse::<u64>()
                .map_err(|_| AllowlistError::InvalidId(trimmed.to_string()))?;
            ids.insert(id);
        }
        Ok(Self { ids })
    }

    pub fn extend(&mut self, other: Allowlist) {
        self.ids.extend(other.ids);
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Matches either the parent channel or the exact thread id, so both
    /// "listen on this channel" and "listen on this thread" configurations work.
    pub fn is_allowed(&self, container: &Container) -> bool {
        if self.ids.is_empty() {
            return true;
        }
        self.ids.contains(&container.resolve().parent_id) || self.ids.contains(&container.id())
    }

    /// Sorted ids, for startup logging.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
