//! Bot configuration.

use gatekeep_core::{Error, PrincipalId, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration file read from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "gatekeep.toml";

/// Prefix of environment overrides, e.g. `GATEKEEP_DATA_DIR`.
pub const ENV_PREFIX: &str = "GATEKEEP";

/// Settings given as comma-separated lists in the environment.
const LIST_KEYS: &[&str] = &["admin_ids", "channels"];

/// Bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Directory holding `users.json` and `keys.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Principals allowed to issue keys.
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    /// Channels every principal must belong to.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Bot API token used for membership lookups.
    pub bot_token: Option<String>,
    /// Bot API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Contact shown by `/owner`.
    pub owner: Option<String>,
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,
    #[serde(default = "default_max_payload_kb")]
    pub max_payload_kb: usize,
    /// Bound on one membership lookup, in seconds.
    #[serde(default = "default_membership_timeout_secs")]
    pub membership_timeout_secs: u64,
    /// Treat entitlements past their expiry as absent.
    #[serde(default = "default_enforce_expiry")]
    pub enforce_entitlement_expiry: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_message_limit() -> usize {
    4096
}

fn default_max_payload_kb() -> usize {
    64
}

fn default_membership_timeout_secs() -> u64 {
    5
}

fn default_enforce_expiry() -> bool {
    true
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            admin_ids: Vec::new(),
            channels: Vec::new(),
            bot_token: None,
            api_url: default_api_url(),
            owner: None,
            message_limit: default_message_limit(),
            max_payload_kb: default_max_payload_kb(),
            membership_timeout_secs: default_membership_timeout_secs(),
            enforce_entitlement_expiry: default_enforce_expiry(),
        }
    }
}

impl BotConfig {
    /// Load `.env`, then `gatekeep.toml` (or `path`) and `GATEKEEP_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!(path = %env_file.display(), "Loaded environment file");
        }
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Self::from_sources(Some(path), None)
    }

    /// Layer an optional file and environment variables over the defaults.
    ///
    /// `vars` replaces the process environment when given. The legacy
    /// `TELEGRAM_TOKEN` and `ADMIN_IDS` variables fill settings that are
    /// otherwise unset.
    pub fn from_sources(file: Option<&Path>, vars: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(false));
        }
        let mut environment = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .ignore_empty(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        builder = builder.add_source(environment.source(vars.clone()));

        let mut config: BotConfig = builder
            .build()
            .and_then(scalars_as_lists)
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))?;

        let legacy = |name: &str| match &vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        if config.bot_token.is_none() {
            config.bot_token = legacy("TELEGRAM_TOKEN").filter(|t| !t.trim().is_empty());
        }
        if config.admin_ids.is_empty()
            && let Some(raw) = legacy("ADMIN_IDS")
        {
            config.admin_ids =
                parse_list(&raw).map_err(|e| Error::Config(format!("invalid ADMIN_IDS: {e}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.message_limit == 0 {
            return Err(Error::Config("message_limit must be positive".to_string()));
        }
        if self.max_payload_kb == 0 {
            return Err(Error::Config("max_payload_kb must be positive".to_string()));
        }
        if !self.channels.is_empty() && self.bot_token.is_none() {
            return Err(Error::Config(
                "channels are configured but no bot token is set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn admins(&self) -> impl Iterator<Item = PrincipalId> + '_ {
        self.admin_ids.iter().copied().map(PrincipalId::new)
    }
}

/// Split a comma-separated list, skipping blank entries.
fn parse_list<T>(raw: &str) -> std::result::Result<Vec<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|e| format!("'{s}': {e}")))
        .collect()
}

/// A lone `GATEKEEP_ADMIN_IDS=5` parses as a number rather than a list.
fn scalars_as_lists(
    settings: config::Config,
) -> std::result::Result<config::Config, config::ConfigError> {
    let mut builder = config::Config::builder().add_source(settings.clone());
    for key in LIST_KEYS {
        if let Ok(value) = settings.get::<config::Value>(key)
            && !matches!(value.kind, config::ValueKind::Array(_))
        {
            builder = builder.set_override(*key, vec![value])?;
        }
    }
    builder.build()
}
