use std::env;
use std::time::Duration;

use crate::command::CommandScope;
use crate::container::Allowlist;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DISCORD_API_BASE_URL: &str = "https://discord.com/api/v10";

/// Env vars whose comma-separated ids are merged into the allowlist.
const ALLOWLIST_KEYS: [&str; 3] = ["LISTEN_CHANNEL_ID", "CHANNELS", "CHANNEL_WHITELIST"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Relay settings, built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Discord bot token
    pub discord_token: String,
    /// Forward webhook. Only `None` in dry-run mode.
    pub forward_url: Option<String>,
    /// Assign webhook; `!human` / `!bot` are answered with a notice when unset
    pub assign_url: Option<String>,
    pub allowlist: Allowlist,
    pub command_scope: CommandScope,
    /// Log payloads instead of failing startup when no forward webhook is set
    pub dry_run: bool,
    pub request_timeout: Duration,
    pub discord_api_base_url: String,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let dry_run = get("RELAY_DRY_RUN").map(|v| parse_flag(&v)).unwrap_or(false);

        let discord_token = get("DISCORD_TOKEN").or_else(|| get("DISCORD_BOT_TOKEN"));
        let forward_url = get("FORWARD_URL").or_else(|| get("PIPE_URL"));

        let mut missing = Vec::new();
        if discord_token.is_none() {
            missing.push("DISCORD_TOKEN");
        }
        if forward_url.is_none() && !dry_run {
            missing.push("FORWARD_URL (or PIPE_URL)");
        }
        let discord_token = match discord_token {
            Some(token) if missing.is_empty() => token,
            _ => return Err(ConfigError::Missing(missing)),
        };

        let mut allowlist = Allowlist::default();
        for key in ALLOWLIST_KEYS {
            if let Some(raw) = get(key) {
                let parsed = Allowlist::parse(&raw)
                    .map_err(|err| ConfigError::Invalid {
                        key,
                        message: err.to_string(),
                    })?;
                allowlist.extend(parsed);
            }
        }

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                message: format!("'{}' is not a valid port", raw),
            })?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "REQUEST_TIMEOUT_SECS",
                    message: format!("'{}' is not a positive number of seconds", raw),
                })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let command_scope = if get("COMMANDS_REQUIRE_THREAD")
            .map(|v| parse_flag(&v))
            .unwrap_or(false)
        {
            CommandScope::ThreadOnly
        } else {
            CommandScope::AnyContainer
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            discord_token,
            forward_url,
            assign_url: get("ASSIGN_URL"),
            allowlist,
            command_scope,
            dry_run,
            request_timeout,
            discord_api_base_url: get("DISCORD_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DISCORD_API_BASE_URL.to_string()),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<RelayConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("FORWARD_URL", "https://n8n.example/webhook/forward"),
        ])
        .unwrap();

        assert_eq!(config.discord_token, "token");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.assign_url.is_none());
        assert!(config.allowlist.is_empty());
        assert_eq!(config.command_scope, CommandScope::AnyContainer);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(!config.dry_run);
    }

    #[test]
    fn reports_every_missing_required_key() {
        let err = config_from(&[]).unwrap_err();
        match err {
            ConfigError::Missing(keys) => {
                assert_eq!(keys, vec!["DISCORD_TOKEN", "FORWARD_URL (or PIPE_URL)"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = config_from(&[("DISCORD_TOKEN", "  "), ("PIPE_URL", "https://x")]).unwrap_err();
        assert!(err.to_string().contains("DISCORD_TOKEN"));
    }

    #[test]
    fn legacy_aliases_are_accepted() {
        let config = config_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("PIPE_URL", "https://n8n.example/webhook/pipe"),
        ])
        .unwrap();
        assert_eq!(
            config.forward_url.as_deref(),
            Some("https://n8n.example/webhook/pipe")
        );
    }

    #[test]
    fn allowlist_keys_are_merged() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("FORWARD_URL", "https://x"),
            ("LISTEN_CHANNEL_ID", "1"),
            ("CHANNELS", "2, 3"),
            ("CHANNEL_WHITELIST", "3,4"),
        ])
        .unwrap();
        assert_eq!(config.allowlist.ids(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn invalid_allowlist_is_rejected() {
        let err = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("FORWARD_URL", "https://x"),
            ("CHANNELS", "general"),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid CHANNELS: invalid channel id 'general'");
    }

    #[test]
    fn dry_run_makes_forward_url_optional() {
        let config = config_from(&[("DISCORD_TOKEN", "token"), ("RELAY_DRY_RUN", "true")]).unwrap();
        assert!(config.dry_run);
        assert!(config.forward_url.is_none());
    }

    #[test]
    fn optional_settings_are_parsed() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("FORWARD_URL", "https://x"),
            ("ASSIGN_URL", "https://y"),
            ("PORT", "8080"),
            ("COMMANDS_REQUIRE_THREAD", "yes"),
            ("REQUEST_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(config.assign_url.as_deref(), Some("https://y"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.command_scope, CommandScope::ThreadOnly);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("FORWARD_URL", "https://x"),
            ("PORT", "http"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
