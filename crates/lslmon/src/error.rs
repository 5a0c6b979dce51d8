//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use lslmon_config::ConfigError;
use lslmon_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Directory ────────────────────────────────────────────────────
    #[error("Stream directory unavailable")]
    #[diagnostic(
        code(lslmon::directory_unavailable),
        help(
            "Check that the directory service is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    DirectoryUnavailable { reason: String },

    #[error("Could not connect to stream '{stream}'")]
    #[diagnostic(code(lslmon::connection_failed), help("{reason}"))]
    ConnectionFailed { stream: String, reason: String },

    // ── Streams ──────────────────────────────────────────────────────
    #[error("Stream '{name}' not found")]
    #[diagnostic(
        code(lslmon::not_found),
        help("Run: lslmon list to see the visible streams")
    )]
    StreamNotFound { name: String },

    // ── Unsupported ──────────────────────────────────────────────────
    #[error("Backend '{backend}' is not available in this build")]
    #[diagnostic(
        code(lslmon::unsupported),
        help("This backend requires {required}. Or use: --backend http --url <URL>")
    )]
    Unsupported { backend: String, required: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lslmon::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists")]
    #[diagnostic(
        code(lslmon::config_exists),
        help("Use --force to overwrite it.\nPath: {path}")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(lslmon::config),
        help("Check the config file (lslmon config path) and LSLMON_* variables.")
    )]
    Config(ConfigError),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(lslmon::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(lslmon::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DirectoryUnavailable { .. } | Self::ConnectionFailed { .. } => {
                exit_code::CONNECTION
            }
            Self::StreamNotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. } | Self::ConfigExists { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DirectoryUnavailable { message } => {
                CliError::DirectoryUnavailable { reason: message }
            }
            CoreError::ConnectionFailed { stream, reason } => {
                CliError::ConnectionFailed { stream, reason }
            }
            CoreError::MalformedMetadata { stream, source } => CliError::ConnectionFailed {
                stream,
                reason: source.to_string(),
            },
            CoreError::StreamNotFound { name } => CliError::StreamNotFound { name },
            CoreError::Unsupported { backend, required } => {
                CliError::Unsupported { backend, required }
            }
            CoreError::Config { message } => CliError::Validation {
                field: "directory".into(),
                reason: message,
            },
            CoreError::Runtime { message } | CoreError::Internal(message) => {
                CliError::Internal(message)
            }
        }
    }
}
