// src/config/app.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const ENV_WEBHOOK_URL: &str = "DISCORD_HOOK_URL";
pub const ENV_APP_ID: &str = "STEAM_APP_ID";
pub const ENV_SCOPE: &str = "PARAMETER_STORE_SCOPE";
pub const ENV_STORE_FILE: &str = "PARAMETER_STORE_FILE";
pub const ENV_FEED_BASE_URL: &str = "STEAM_STORE_BASE_URL";
pub const ENV_HTTP_TIMEOUT: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL: &str = "POLL_INTERVAL_SECS";
pub const ENV_CONFIG_PATH: &str = "NOTIFIER_CONFIG_PATH";
pub const ENV_METRICS_LOG: &str = "METRICS_LOG";

pub const DEFAULT_STORE_FILE: &str = "state/parameters.json";
pub const DEFAULT_FEED_BASE_URL: &str = "http://store.steampowered.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Settings for one notifier process, validated once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub webhook_url: String,
    pub app_id: String,
    /// Prefix of the watermark parameter; expected to end with a separator.
    pub parameter_store_scope: String,
    pub parameter_store_file: PathBuf,
    pub feed_base_url: String,
    pub http_timeout_secs: u64,
    /// `None` runs once and exits.
    pub poll_interval_secs: Option<u64>,
    /// Log the Prometheus exposition text after every run.
    pub metrics_log: bool,
}

/// Optional TOML file; every key may be overridden by the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    webhook_url: Option<String>,
    app_id: Option<String>,
    parameter_store_scope: Option<String>,
    parameter_store_file: Option<String>,
    feed_base_url: Option<String>,
    http_timeout_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
    metrics_log: Option<bool>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let file_err = |message: String| ConfigError::File {
        path: path.display().to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
    toml::from_str(&content).map_err(|e| file_err(e.to_string()))
}

fn parse_secs(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidValue {
            key,
            message: format!("expected a positive number of seconds, got {raw:?}"),
        }),
        Ok(n) => Ok(n),
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            message: format!("expected 1/0 or true/false, got {raw:?}"),
        }),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from `lookup` (normally the process environment),
    /// falling back to the TOML file named by `NOTIFIER_CONFIG_PATH`.
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match non_empty(lookup(ENV_CONFIG_PATH)) {
            Some(p) => load_file(Path::new(&p))?,
            None => FileConfig::default(),
        };
        let pick = |key: &str, from_file: Option<String>| {
            non_empty(lookup(key)).or_else(|| non_empty(from_file))
        };

        let webhook_url = pick(ENV_WEBHOOK_URL, file.webhook_url)
            .ok_or(ConfigError::MissingSetting(ENV_WEBHOOK_URL))?;
        let app_id =
            pick(ENV_APP_ID, file.app_id).ok_or(ConfigError::MissingSetting(ENV_APP_ID))?;
        let parameter_store_scope = pick(ENV_SCOPE, file.parameter_store_scope)
            .ok_or(ConfigError::MissingSetting(ENV_SCOPE))?;
        // The watermark key is `scope + "timestamp"`; without the trailing
        // separator it would not be a child of the scope it is read from.
        if !parameter_store_scope.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                key: ENV_SCOPE,
                message: format!("expected a path ending in '/', got {parameter_store_scope:?}"),
            });
        }

        if !(webhook_url.starts_with("https://") || webhook_url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                key: ENV_WEBHOOK_URL,
                message: "expected an http(s) URL".into(),
            });
        }
        if !app_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidValue {
                key: ENV_APP_ID,
                message: format!("expected a numeric app id, got {app_id:?}"),
            });
        }

        let parameter_store_file = pick(ENV_STORE_FILE, file.parameter_store_file)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));
        let feed_base_url = pick(ENV_FEED_BASE_URL, file.feed_base_url)
            .unwrap_or_else(|| DEFAULT_FEED_BASE_URL.to_string());

        let timeout_raw = pick(
            ENV_HTTP_TIMEOUT,
            file.http_timeout_secs.map(|n| n.to_string()),
        );
        let http_timeout_secs = match timeout_raw {
            Some(raw) => parse_secs(ENV_HTTP_TIMEOUT, &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        let poll_interval_secs = pick(
            ENV_POLL_INTERVAL,
            file.poll_interval_secs.map(|n| n.to_string()),
        )
        .map(|raw| parse_secs(ENV_POLL_INTERVAL, &raw))
        .transpose()?;
        let metrics_log = pick(ENV_METRICS_LOG, file.metrics_log.map(|b| b.to_string()))
            .map(|raw| parse_flag(ENV_METRICS_LOG, &raw))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            webhook_url,
            app_id,
            parameter_store_scope,
            parameter_store_file,
            feed_base_url,
            http_timeout_secs,
            poll_interval_secs,
            metrics_log,
        })
    }

    /// Full name the watermark is written under. Plain concatenation: the
    /// scope already ends with its separator.
    pub fn watermark_key(&self) -> String {
        format!("{}timestamp", self.parameter_store_scope)
    }
}
