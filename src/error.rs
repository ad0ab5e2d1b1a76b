//! Error types for the message pipeline, the transports and the settings layer.

use std::io;

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Failure while turning a selected file into a `data:` URI.
///
/// A failed encode aborts the whole compose-and-send: nothing is emitted and
/// nothing is appended to the history.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The file could not be read (missing, permissions, removed mid-read).
    #[error("failed to read attachment {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    /// The file is larger than the configured attachment bound.
    #[error("attachment {name} is {size} bytes, over the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },
}

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("not connected")]
    NotConnected,
    #[error("connection closed")]
    Closed,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("framing error: {0}")]
    Codec(#[from] LinesCodecError),
    #[error("failed to serialize frame: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("tls error: {0}")]
    Tls(String),
}

/// Failure loading, saving or validating [`Settings`](crate::config::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    NoConfigDir,
    #[error("settings i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Crate-level error returned by session and client entry points.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
