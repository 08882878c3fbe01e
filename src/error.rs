//! Error types for the review notifier.
//!
//! Only `DeliveryError` is non-fatal: the scanner logs it and moves on.
//! Everything else aborts the run before the watermark is written.

/// Top-level error returned by a notifier run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Review feed unavailable: {0}")]
    Feed(#[from] FeedError),

    #[error("Parameter store error: {0}")]
    Store(#[from] StoreError),
}

/// Missing/invalid settings, or a stored watermark that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("Failed to read config file {path}: {message}")]
    File { path: String, message: String },

    #[error("Stored watermark missing under scope {scope}")]
    WatermarkMissing { scope: String },

    #[error("Stored watermark is not an integer: {value:?}")]
    WatermarkInvalid { value: String },
}

/// A feed page could not be fetched or decoded.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The webhook did not accept a notification.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook returned status {0}")]
    Status(u16),
}

/// Reading or writing the parameter store failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt parameter file {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
