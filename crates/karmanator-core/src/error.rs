use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the Karmanator bot.
#[derive(Error, Debug)]
pub enum KarmaError {
    // ── Persistence errors ─────────────────────────────────────
    #[error("karma store unavailable: {}: {reason}", .path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error("karma store is malformed: {}: {reason}", .path.display())]
    MalformedStore { path: PathBuf, reason: String },

    // ── Classification errors ──────────────────────────────────
    /// Reserved. Classification is total over all inputs and never fails.
    #[error("classification error: {0}")]
    Classification(String),

    // ── Channel errors ─────────────────────────────────────────
    #[error("channel error: {channel}: {reason}")]
    Channel { channel: String, reason: String },

    #[error("channel not connected: {0}")]
    ChannelNotConnected(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl KarmaError {
    /// True for failures reading, writing or parsing the karma store.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            KarmaError::Persistence { .. } | KarmaError::MalformedStore { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, KarmaError>;
