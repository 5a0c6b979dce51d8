//! CLI configuration: re-exports `lslmon_config` and layers the global
//! flags on top of the loaded file and environment values.

use clap::ValueEnum;

pub use lslmon_config::{Config, config_path, load_config, save_config_to, to_directory_config};

use lslmon_core::{DirectoryConfig, MonitorConfig};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Everything a command needs, resolved from config + flags.
#[derive(Debug)]
pub struct Settings {
    pub directory: DirectoryConfig,
    pub monitor: MonitorConfig,
    pub output: OutputFormat,
    pub color: bool,
    pub max_entries: usize,
    pub auto_update: bool,
    pub quiet: bool,
}

/// Load the config file + environment and apply flag overrides.
pub fn load_with_overrides(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config()?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

/// Flags win over file and environment values.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(backend) = global.backend {
        cfg.directory.backend = backend.as_str().into();
    }
    if let Some(ref url) = global.url {
        cfg.directory.url.clone_from(url);
    }
    if let Some(ref token) = global.token {
        cfg.directory.api_token = Some(token.clone());
        cfg.directory.api_token_env = None;
    }
    if global.insecure {
        cfg.directory.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.directory.timeout = timeout;
    }
    if let Some(resolve_time) = global.resolve_time {
        cfg.polling.resolve_time = resolve_time;
    }
    if let Some(poll_interval) = global.poll_interval {
        cfg.polling.poll_interval = poll_interval;
    }
    if let Some(forget_after) = global.forget_after {
        cfg.polling.forget_after = forget_after;
    }
    if let Some(max_entries) = global.max_entries {
        cfg.defaults.max_entries = max_entries;
    }
}

/// Resolve the effective settings for a command run.
pub fn resolve(global: &GlobalOpts) -> Result<Settings, CliError> {
    let cfg = load_with_overrides(global)?;
    settings_from(&cfg, global)
}

pub fn settings_from(cfg: &Config, global: &GlobalOpts) -> Result<Settings, CliError> {
    let output = match global.output {
        Some(format) => format,
        None => parse_value::<OutputFormat>("defaults.output", &cfg.defaults.output)?,
    };
    let color = match global.color {
        Some(mode) => mode,
        None => parse_value::<ColorMode>("defaults.color", &cfg.defaults.color)?,
    };

    Ok(Settings {
        directory: to_directory_config(&cfg.directory)?,
        monitor: lslmon_config::to_monitor_config(&cfg.polling)?,
        output,
        color: crate::output::should_color(color),
        max_entries: cfg.defaults.max_entries,
        auto_update: cfg.polling.auto_update,
        quiet: global.quiet,
    })
}

fn parse_value<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("unknown value '{value}'"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["lslmon"];
        argv.extend_from_slice(args);
        argv.push("list");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_config_values() {
        let mut cfg = Config::default();
        cfg.directory.api_token_env = Some("LAB_TOKEN".into());
        let opts = global(&[
            "--backend",
            "lsl",
            "--token",
            "secret",
            "--resolve-time",
            "0.5",
            "--forget-after",
            "3",
            "-n",
            "5",
        ]);
        apply_overrides(&mut cfg, &opts);

        assert_eq!(cfg.directory.backend, "lsl");
        assert_eq!(cfg.directory.api_token.as_deref(), Some("secret"));
        assert!(cfg.directory.api_token_env.is_none());
        assert!((cfg.polling.resolve_time - 0.5).abs() < f64::EPSILON);
        assert!((cfg.polling.forget_after - 3.0).abs() < f64::EPSILON);
        assert_eq!(cfg.defaults.max_entries, 5);
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        let settings = settings_from(&cfg, &global(&["--color", "never"])).unwrap();
        assert_eq!(settings.output, OutputFormat::Yaml);
        assert!(!settings.color);

        let settings = settings_from(&cfg, &global(&["-o", "json", "--color", "never"])).unwrap();
        assert_eq!(settings.output, OutputFormat::Json);
    }

    #[test]
    fn unknown_output_in_config_is_rejected() {
        let mut cfg = Config::default();
        cfg.defaults.output = "xml".into();
        let err = settings_from(&cfg, &global(&[])).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "defaults.output"));
    }
}
