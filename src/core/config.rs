//! Bot configuration
//!
//! Built once at startup and passed explicitly to the dispatcher and every
//! execution context. Values come from an optional YAML file (`BEANLY_CONFIG`)
//! overridden by environment variables (a `.env` file is honoured by the binary).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Optional YAML file layer under the environment
//! - 1.0.0: Environment-only configuration

use anyhow::{anyhow, Context as _, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::platform::UserId;

pub const DEFAULT_PREFIX: &str = "..";
pub const DEFAULT_ACTIVITY: &str = "for ..help.";
pub const DEFAULT_PAGINATOR_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub owner_id: UserId,
    pub prefix: String,
    pub activity: String,
    pub log_level: String,
    pub paginator_timeout: Duration,
}

/// Shape of the optional YAML file; every field may be overridden by the environment
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    token: Option<String>,
    owner_id: Option<u64>,
    prefix: Option<String>,
    activity: Option<String>,
    log_level: Option<String>,
    paginator_timeout_secs: Option<u64>,
}

impl FileConfig {
    fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        let config: FileConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {path}"))?;
        Ok(config)
    }
}

impl Config {
    /// Load configuration from `BEANLY_CONFIG` (if set) and the process environment
    pub fn from_env() -> Result<Self> {
        let file = match std::env::var("BEANLY_CONFIG") {
            Ok(path) => FileConfig::load(&path)?,
            Err(_) => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = env("DISCORD_TOKEN")
            .or(file.token)
            .ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

        let owner_id = match env("BOT_OWNER_ID") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("BOT_OWNER_ID is not a valid user id: {raw}"))?,
            None => file
                .owner_id
                .ok_or_else(|| anyhow!("BOT_OWNER_ID must be set"))?,
        };

        let paginator_timeout_secs = match env("PAGINATOR_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("PAGINATOR_TIMEOUT_SECS is not a number: {raw}"))?,
            None => file
                .paginator_timeout_secs
                .unwrap_or(DEFAULT_PAGINATOR_TIMEOUT_SECS),
        };

        let config = Config {
            discord_token,
            owner_id: UserId(owner_id),
            prefix: env("COMMAND_PREFIX")
                .or(file.prefix)
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            activity: env("BOT_ACTIVITY")
                .or(file.activity)
                .unwrap_or_else(|| DEFAULT_ACTIVITY.to_string()),
            log_level: env("LOG_LEVEL")
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            paginator_timeout: Duration::from_secs(paginator_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.discord_token.trim().is_empty() {
            return Err(anyhow!("DISCORD_TOKEN must not be empty"));
        }
        if self.prefix.is_empty() || self.prefix.chars().any(char::is_whitespace) {
            return Err(anyhow!(
                "Command prefix must be non-empty and contain no whitespace: {:?}",
                self.prefix
            ));
        }
        if self.paginator_timeout.is_zero() {
            return Err(anyhow!("PAGINATOR_TIMEOUT_SECS must be greater than zero"));
        }
        Ok(())
    }

    /// Configuration for tests and local tooling
    pub fn for_owner(owner_id: UserId) -> Self {
        Config {
            discord_token: "test-token".to_string(),
            owner_id,
            prefix: DEFAULT_PREFIX.to_string(),
            activity: DEFAULT_ACTIVITY.to_string(),
            log_level: "debug".to_string(),
            paginator_timeout: Duration::from_secs(DEFAULT_PAGINATOR_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::resolve(
            FileConfig::default(),
            env_of(&[("DISCORD_TOKEN", "abc"), ("BOT_OWNER_ID", "42")]),
        )
        .unwrap();
        assert_eq!(config.owner_id, UserId(42));
        assert_eq!(config.prefix, DEFAULT_PREFIX);
        assert_eq!(config.activity, DEFAULT_ACTIVITY);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.paginator_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file: FileConfig =
            serde_yaml::from_str("token: from-file\nowner_id: 7\nprefix: \"!\"\n").unwrap();
        let config = Config::resolve(file, env_of(&[("COMMAND_PREFIX", "$")])).unwrap();
        assert_eq!(config.discord_token, "from-file");
        assert_eq!(config.owner_id, UserId(7));
        assert_eq!(config.prefix, "$");
    }

    #[test]
    fn test_missing_token_is_error() {
        let result = Config::resolve(FileConfig::default(), env_of(&[("BOT_OWNER_ID", "1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_owner_is_error() {
        let result = Config::resolve(
            FileConfig::default(),
            env_of(&[("DISCORD_TOKEN", "abc"), ("BOT_OWNER_ID", "bean")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_prefix_with_space_rejected() {
        let result = Config::resolve(
            FileConfig::default(),
            env_of(&[
                ("DISCORD_TOKEN", "abc"),
                ("BOT_OWNER_ID", "1"),
                ("COMMAND_PREFIX", ". ."),
            ]),
        );
        assert!(result.is_err());
    }
}
