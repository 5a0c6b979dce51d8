// ── Runtime monitor configuration ──
//
// These types describe *what* to watch and *how often*. They carry the
// directory location and optional credentials, but never touch disk.
// The CLI builds them from lslmon-config and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Shortest cycle period the poll loop will run at.
pub const MIN_CYCLE_PERIOD: Duration = Duration::from_millis(10);

/// Polling cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// How long one resolution may aggregate results.
    pub resolve_time: Duration,
    /// Minimum spacing between cycle starts. Zero means back-to-back.
    pub poll_interval: Duration,
    /// Keep reporting a stream this long after its last sighting.
    /// Zero disables the grace window.
    pub forget_after: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            resolve_time: Duration::from_secs(1),
            poll_interval: Duration::ZERO,
            forget_after: Duration::ZERO,
        }
    }
}

impl MonitorConfig {
    /// Time between the starts of two loop cycles.
    pub fn cycle_period(&self) -> Duration {
        self.resolve_time
            .max(self.poll_interval)
            .max(MIN_CYCLE_PERIOD)
    }
}

/// TLS verification strategy for the HTTP directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab servers).
    DangerAcceptInvalid,
}

/// Location of an HTTP stream directory.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    /// Base URL (e.g. `http://lab-gateway:8765/lsl/`).
    pub url: Url,
    /// Bearer token, if the directory requires one.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Which directory backend to poll.
#[derive(Debug, Clone)]
pub enum DirectoryConfig {
    Http(HttpEndpoint),
    /// Native LSL network through liblsl.
    Lsl { connect_timeout: Duration },
}

impl DirectoryConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Lsl { .. } => "lsl",
        }
    }
}
