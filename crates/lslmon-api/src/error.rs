use thiserror::Error;

/// Top-level error type for the `lslmon-api` crate.
///
/// Covers every failure mode of the directory clients: HTTP transport,
/// directory-level rejections, payload decoding, and liblsl calls.
/// `lslmon-core` folds these into its per-stream error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("URL cannot be used as a directory base: {0}")]
    InvalidBaseUrl(String),

    /// The bearer token cannot be sent as an HTTP header value.
    #[error("Directory token contains characters not allowed in an HTTP header")]
    InvalidToken,

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Directory ───────────────────────────────────────────────────
    /// Non-success status returned by the directory service.
    #[error("Directory error (HTTP {status}): {message}")]
    Directory { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── liblsl ──────────────────────────────────────────────────────
    /// A liblsl call failed (resolution, inlet creation, info query).
    #[error("liblsl error: {0}")]
    Lsl(String),
}
