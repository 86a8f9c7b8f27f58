//! `!human` / `!bot` assignment commands.

use std::fmt;

use serde::Serialize;

/// Who should handle a conversation from now on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignAction {
    Human,
    Bot,
}

impl AssignAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignAction::Human => "human",
            AssignAction::Bot => "bot",
        }
    }
}

impl fmt::Display for AssignAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where assignment commands are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandScope {
    /// Any allowed container, including the parent channel.
    #[default]
    AnyContainer,
    /// Only inside threads; commands in a parent channel get a guidance reply.
    ThreadOnly,
}

/// Recognize an assignment command. The whole message must be the command,
/// ignoring surrounding whitespace and case.
pub fn parse_command(content: &str) -> Option<AssignAction> {
    match content.trim().to_lowercase().as_str() {
        "!human" => Some(AssignAction::Human),
        "!bot" => Some(AssignAction::Bot),
        _ => None,
    }
}
