//! `lslmon config`: inspect and initialize the config file.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let mut cfg = config::load_with_overrides(global)?;
            mask_secrets(&mut cfg);
            let out = render_config(&cfg, global.output.unwrap_or(OutputFormat::Table))?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config_to(&Config::default(), &path)?;
            tracing::info!(path = %path.display(), "config written");
            output::print_output(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }
    }
}

fn mask_secrets(cfg: &mut Config) {
    if cfg.directory.api_token.is_some() {
        cfg.directory.api_token = Some(MASK.into());
    }
}

fn render_config(cfg: &Config, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => output::render_json(cfg, false),
        OutputFormat::JsonCompact => output::render_json(cfg, true),
        OutputFormat::Yaml => {
            serde_yaml::to_string(cfg).map_err(|e| CliError::Render(e.to_string()))
        }
        OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(cfg)
            .map(|s| s.trim_end().to_owned())
            .map_err(|e| CliError::Render(e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_is_masked() {
        let mut cfg = Config::default();
        cfg.directory.api_token = Some("hunter2".into());
        mask_secrets(&mut cfg);
        let text = render_config(&cfg, OutputFormat::Table).unwrap();
        assert!(text.contains("api_token = \"****\""));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn absent_token_stays_absent() {
        let mut cfg = Config::default();
        mask_secrets(&mut cfg);
        let json = render_config(&cfg, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["directory"].get("api_token").is_none());
        assert_eq!(value["polling"]["resolve_time"], 1.0);
    }
}
