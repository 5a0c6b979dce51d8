//! Configuration for lslmon.
//!
//! TOML file + `LSLMON_` environment layering, token resolution, and
//! translation to `lslmon_core::{MonitorConfig, DirectoryConfig}`. The CLI
//! applies its flag overrides on top of the values loaded here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lslmon_core::{DirectoryConfig, HttpEndpoint, MonitorConfig, TlsVerification};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "LSLMON_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Presentation defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Where streams are discovered.
    #[serde(default)]
    pub directory: DirectorySettings,

    /// Discovery cadence.
    #[serde(default)]
    pub polling: PollingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Most streams a listing shows. Presentation only.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_max_entries() -> usize {
    50
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DirectorySettings {
    /// "http" or "lsl". Defaults to "lsl" when built with liblsl.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// HTTP directory base URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Bearer token (plaintext -- prefer `api_token_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Environment variable name containing the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    #[serde(default)]
    pub insecure: bool,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// liblsl inlet open timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: f64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_url(),
            api_token: None,
            api_token_env: None,
            ca_cert: None,
            insecure: false,
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_backend() -> String {
    if cfg!(feature = "lsl") { "lsl" } else { "http" }.into()
}
fn default_url() -> String {
    "http://localhost:8765/".into()
}
fn default_timeout() -> f64 {
    10.0
}
fn default_connect_timeout() -> f64 {
    5.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollingSettings {
    /// Seconds one resolution may aggregate results.
    #[serde(default = "default_resolve_time")]
    pub resolve_time: f64,

    /// Minimum seconds between cycle starts.
    #[serde(default)]
    pub poll_interval: f64,

    /// Seconds a vanished stream is still reported. 0 disables.
    #[serde(default)]
    pub forget_after: f64,

    /// Start the background loop when watching.
    #[serde(default = "default_auto_update")]
    pub auto_update: bool,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            resolve_time: default_resolve_time(),
            poll_interval: 0.0,
            forget_after: 0.0,
            auto_update: default_auto_update(),
        }
    }
}

fn default_resolve_time() -> f64 {
    1.0
}
fn default_auto_update() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `LSLMON_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "lslmon", "lslmon").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lslmon");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `LSLMON_*` variables.
/// Nested keys use a double underscore: `LSLMON_POLLING__RESOLVE_TIME`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LSLMON_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent
/// directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

/// Resolve the directory token: the variable named by `api_token_env`
/// first, then the plaintext value.
pub fn resolve_api_token(settings: &DirectorySettings) -> Option<SecretString> {
    if let Some(ref env_name) = settings.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }
    settings
        .api_token
        .as_ref()
        .map(|token| SecretString::from(token.clone()))
}

/// Parse a seconds value, rejecting negative and non-finite numbers.
pub fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("expected a non-negative number of seconds, got {value}"),
    })
}

pub fn to_monitor_config(polling: &PollingSettings) -> Result<MonitorConfig, ConfigError> {
    Ok(MonitorConfig {
        resolve_time: seconds("resolve_time", polling.resolve_time)?,
        poll_interval: seconds("poll_interval", polling.poll_interval)?,
        forget_after: seconds("forget_after", polling.forget_after)?,
    })
}

pub fn to_directory_config(settings: &DirectorySettings) -> Result<DirectoryConfig, ConfigError> {
    match settings.backend.as_str() {
        "http" => {
            let url: url::Url = settings.url.parse().map_err(|_| ConfigError::Validation {
                field: "url".into(),
                reason: format!("invalid URL: {}", settings.url),
            })?;

            let tls = if settings.insecure {
                TlsVerification::DangerAcceptInvalid
            } else if let Some(ref ca_path) = settings.ca_cert {
                TlsVerification::CustomCa(ca_path.clone())
            } else {
                TlsVerification::SystemDefaults
            };

            Ok(DirectoryConfig::Http(HttpEndpoint {
                url,
                token: resolve_api_token(settings),
                tls,
                timeout: seconds("timeout", settings.timeout)?,
            }))
        }
        "lsl" => Ok(DirectoryConfig::Lsl {
            connect_timeout: seconds("connect_timeout", settings.connect_timeout)?,
        }),
        other => Err(ConfigError::Validation {
            field: "backend".into(),
            reason: format!("expected 'http' or 'lsl', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn jail_err(err: ConfigError) -> figment::Error {
        figment::Error::from(err.to_string())
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml")).map_err(jail_err)?;
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.polling.resolve_time, 1.0);
            assert_eq!(cfg.defaults.max_entries, 50);
            assert!(cfg.polling.auto_update);
            Ok(())
        });
    }

    #[test]
    fn file_values_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lslmon.toml",
                r#"
                [directory]
                backend = "lsl"

                [polling]
                resolve_time = 2.5
                forget_after = 10
                "#,
            )?;
            let cfg = load_config_from(Path::new("lslmon.toml")).map_err(jail_err)?;
            assert_eq!(cfg.directory.backend, "lsl");
            assert_eq!(cfg.polling.resolve_time, 2.5);
            assert_eq!(cfg.polling.forget_after, 10.0);
            assert_eq!(cfg.directory.timeout, 10.0);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("lslmon.toml", "[polling]\nresolve_time = 2.0\n")?;
            jail.set_env("LSLMON_POLLING__RESOLVE_TIME", "0.5");
            jail.set_env("LSLMON_DEFAULTS__MAX_ENTRIES", "7");
            let cfg = load_config_from(Path::new("lslmon.toml")).map_err(jail_err)?;
            assert_eq!(cfg.polling.resolve_time, 0.5);
            assert_eq!(cfg.defaults.max_entries, 7);
            Ok(())
        });
    }

    #[test]
    fn token_env_wins_over_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("LAB_DIRECTORY_TOKEN", "from-env");
            let settings = DirectorySettings {
                api_token: Some("from-file".into()),
                api_token_env: Some("LAB_DIRECTORY_TOKEN".into()),
                ..DirectorySettings::default()
            };
            let token = resolve_api_token(&settings).unwrap();
            assert_eq!(token.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.polling.poll_interval = 3.0;
        cfg.directory.url = "https://gateway.lab:9000/lsl/".into();

        save_config_to(&cfg, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("poll_interval = 3.0"));
        assert!(!text.contains("api_token"));

        let loaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn monitor_config_from_polling() {
        let polling = PollingSettings {
            resolve_time: 0.25,
            poll_interval: 2.0,
            forget_after: 5.0,
            auto_update: false,
        };
        let monitor = to_monitor_config(&polling).unwrap();
        assert_eq!(monitor.resolve_time, Duration::from_millis(250));
        assert_eq!(monitor.poll_interval, Duration::from_secs(2));
        assert_eq!(monitor.forget_after, Duration::from_secs(5));
    }

    #[test]
    fn negative_seconds_rejected() {
        let polling = PollingSettings {
            resolve_time: -1.0,
            ..PollingSettings::default()
        };
        let err = to_monitor_config(&polling).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "resolve_time"));
    }

    #[test]
    fn default_backend_follows_build() {
        let expected = if cfg!(feature = "lsl") { "lsl" } else { "http" };
        assert_eq!(DirectorySettings::default().backend, expected);
    }

    #[test]
    fn directory_config_by_backend() {
        let settings = DirectorySettings {
            backend: "http".into(),
            insecure: true,
            ..DirectorySettings::default()
        };
        match to_directory_config(&settings).unwrap() {
            DirectoryConfig::Http(endpoint) => {
                assert_eq!(endpoint.url.as_str(), "http://localhost:8765/");
                assert_eq!(endpoint.tls, TlsVerification::DangerAcceptInvalid);
                assert_eq!(endpoint.timeout, Duration::from_secs(10));
            }
            DirectoryConfig::Lsl { .. } => panic!("expected http backend"),
        }

        let settings = DirectorySettings {
            backend: "lsl".into(),
            ..DirectorySettings::default()
        };
        assert!(matches!(
            to_directory_config(&settings).unwrap(),
            DirectoryConfig::Lsl { connect_timeout } if connect_timeout == Duration::from_secs(5)
        ));
    }

    #[test]
    fn unknown_backend_rejected() {
        let settings = DirectorySettings {
            backend: "zeroconf".into(),
            ..DirectorySettings::default()
        };
        let err = to_directory_config(&settings).unwrap_err();
        assert!(err.to_string().contains("zeroconf"));
    }

    #[test]
    fn bad_url_rejected() {
        let settings = DirectorySettings {
            url: "not a url".into(),
            ..DirectorySettings::default()
        };
        assert!(matches!(
            to_directory_config(&settings),
            Err(ConfigError::Validation { .. })
        ));
    }
}
