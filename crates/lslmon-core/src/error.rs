// ── Core error types ──
//
// Errors surfaced by lslmon-core. Consumers never see HTTP statuses or
// liblsl return codes directly; `From<lslmon_api::Error>` folds them into
// the per-stream taxonomy below.

use thiserror::Error;

use crate::model::MetadataError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Directory errors ─────────────────────────────────────────────
    /// The directory could not be queried at all this cycle.
    #[error("Stream directory unavailable: {message}")]
    DirectoryUnavailable { message: String },

    /// A handle for one stream could not be opened.
    #[error("Cannot connect to stream '{stream}': {reason}")]
    ConnectionFailed { stream: String, reason: String },

    /// The stream's info document could not be parsed.
    #[error("Malformed metadata for stream '{stream}': {source}")]
    MalformedMetadata {
        stream: String,
        #[source]
        source: MetadataError,
    },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Stream not found: {name}")]
    StreamNotFound { name: String },

    // ── Setup errors ─────────────────────────────────────────────────
    #[error("Backend '{backend}' is not available (requires {required})")]
    Unsupported { backend: String, required: String },

    #[error("No async runtime available: {message}")]
    Runtime { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lslmon_api::Error> for CoreError {
    fn from(err: lslmon_api::Error) -> Self {
        match err {
            lslmon_api::Error::Transport(_)
            | lslmon_api::Error::Directory { .. }
            | lslmon_api::Error::Lsl(_) => CoreError::DirectoryUnavailable {
                message: err.to_string(),
            },
            lslmon_api::Error::Deserialization { message, body: _ } => {
                CoreError::DirectoryUnavailable {
                    message: format!("unreadable directory response: {message}"),
                }
            }
            lslmon_api::Error::InvalidUrl(_)
            | lslmon_api::Error::InvalidBaseUrl(_)
            | lslmon_api::Error::InvalidToken
            | lslmon_api::Error::Tls(_) => CoreError::Config {
                message: err.to_string(),
            },
        }
    }
}

impl CoreError {
    /// Attach a stream name to a transport error raised while connecting.
    pub(crate) fn connection(stream: &str, err: impl std::fmt::Display) -> Self {
        CoreError::ConnectionFailed {
            stream: stream.to_owned(),
            reason: err.to_string(),
        }
    }
}
