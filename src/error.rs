//! Error types for music and persistence

use thiserror::Error;

/// Music setup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("playlist has no tracks")]
    EmptyPlaylist,
    #[error("failed to load track {path}: {reason}")]
    TrackLoad { path: String, reason: String },
}

/// External key-value store errors
///
/// These never reach callers of `save`/`delete`; they are logged and handed
/// to the optional error handler on [`crate::persistence::SaveStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("browser storage rejected the request: {0}")]
    Browser(String),
    #[error("failed to encode save data: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode save data: {0}")]
    Decode(#[source] serde_json::Error),
}
