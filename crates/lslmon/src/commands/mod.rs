//! Command handlers.

pub mod config_cmd;
pub mod list;
pub mod show;
pub mod watch;

use lslmon_core::{AnyDirectory, ForgetAfter, Monitor};

use crate::cli::Command;
use crate::config::Settings;
use crate::error::CliError;

/// The monitor every stream command runs against.
pub type CliMonitor = Monitor<ForgetAfter<AnyDirectory>>;

/// Route a stream command to its handler.
pub async fn dispatch(cmd: Command, settings: &Settings) -> Result<(), CliError> {
    match cmd {
        Command::List => list::handle(settings).await,
        Command::Show(args) => show::handle(args, settings).await,
        Command::Watch(args) => watch::handle(&args, settings).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}

pub fn build_monitor(settings: &Settings) -> Result<CliMonitor, CliError> {
    let directory = AnyDirectory::from_config(&settings.directory)?;
    let directory = ForgetAfter::new(directory, settings.monitor.forget_after);
    Ok(Monitor::new(directory, settings.monitor.clone()))
}

/// "3 streams found" / "No streams found".
pub fn count_line(count: usize) -> String {
    match count {
        0 => "No streams found".into(),
        1 => "1 stream found".into(),
        n => format!("{n} streams found"),
    }
}

/// Human-readable sample rate.
pub fn format_rate(srate: f64) -> String {
    if srate > 0.0 {
        format!("{srate:.2} Hz")
    } else {
        "irregular".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_line_wording() {
        assert_eq!(count_line(0), "No streams found");
        assert_eq!(count_line(1), "1 stream found");
        assert_eq!(count_line(12), "12 streams found");
    }

    #[test]
    fn zero_rate_is_irregular() {
        assert_eq!(format_rate(0.0), "irregular");
        assert_eq!(format_rate(512.0), "512.00 Hz");
    }
}
