//! `lslmon watch`: run the discovery loop and report changes as they
//! happen. Single-letter commands on stdin steer the monitor.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use lslmon_core::{StreamChange, StreamDescriptor};

use super::show::stream_detail;
use super::{CliMonitor, build_monitor, count_line, format_rate};
use crate::cli::{OutputFormat, WatchArgs};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

const HELP: &str = "commands: r = refresh now, a = toggle automatic updates, \
                    l = list streams, q = quit";

/// What a keyboard command asks the loop to do next.
#[derive(Debug, PartialEq, Eq)]
enum Key {
    Refresh,
    ToggleAuto,
    List,
    Quit,
    Help,
}

impl Key {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "" => None,
            "r" | "refresh" => Some(Self::Refresh),
            "a" | "auto" => Some(Self::ToggleAuto),
            "l" | "list" => Some(Self::List),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => Some(Self::Help),
        }
    }
}

pub async fn handle(args: &WatchArgs, settings: &Settings) -> Result<(), CliError> {
    let monitor = build_monitor(settings)?;
    let mut changes = monitor.changes();

    if settings.auto_update && !args.paused {
        monitor.start().await?;
    } else {
        status(settings, "automatic updates off (press a to enable, r to refresh)");
    }
    if !args.no_input {
        status(settings, HELP);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = !args.no_input;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            // Pending changes are reported before the next command runs.
            biased;

            change = changes.recv() => match change {
                Ok(change) => report_change(&change, settings)?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change feed lagged, listing current streams");
                    list_streams(&monitor, settings);
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    let Some(key) = Key::parse(&line) else { continue };
                    if key == Key::Quit {
                        break;
                    }
                    run_key(&monitor, key, settings).await?;
                }
                // EOF or unreadable stdin: keep watching without input.
                Ok(None) => stdin_open = false,
                Err(e) => {
                    debug!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    monitor.shutdown().await;
    Ok(())
}

async fn run_key(monitor: &CliMonitor, key: Key, settings: &Settings) -> Result<(), CliError> {
    match key {
        Key::Refresh => {
            // A change is reported through the feed; only say so when nothing moved.
            if monitor.poll_once().await.is_none() {
                status(settings, &count_line(monitor.snapshot().len()));
            }
        }
        Key::ToggleAuto => {
            if monitor.is_running() {
                monitor.stop().await;
                status(settings, "automatic updates off");
            } else {
                monitor.start().await?;
                status(settings, "automatic updates on");
            }
        }
        Key::List => list_streams(monitor, settings),
        Key::Help => status(settings, HELP),
        Key::Quit => {}
    }
    Ok(())
}

fn report_change(change: &StreamChange, settings: &Settings) -> Result<(), CliError> {
    let out = match settings.output {
        OutputFormat::Table => change_summary(change, settings.color),
        OutputFormat::Plain => change_names(change),
        // One document per change so the feed can be consumed line by line.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(change, true)?,
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(change).map_err(|e| CliError::Render(e.to_string()))?;
            format!("---\n{}", yaml.trim_end())
        }
    };
    output::print_output(&out, settings.quiet);
    Ok(())
}

/// Human-readable report: a timestamp, one line per added or removed
/// stream, then the stream count after the change.
fn change_summary(change: &StreamChange, color: bool) -> String {
    let mut out = output::dim(&timestamp(change.observed_at), color);
    for descriptor in change.added.values() {
        let _ = write!(
            out,
            "\n{} {}",
            output::added_marker(color),
            stream_line(descriptor)
        );
    }
    for descriptor in change.removed.values() {
        let _ = write!(
            out,
            "\n{} {}",
            output::removed_marker(color),
            stream_line(descriptor)
        );
    }
    let _ = write!(out, "\n{}", count_line(change.streams));
    out
}

fn change_names(change: &StreamChange) -> String {
    let added = change.added.keys().map(|id| format!("+{id}"));
    let removed = change.removed.keys().map(|id| format!("-{id}"));
    added.chain(removed).collect::<Vec<_>>().join("\n")
}

fn stream_line(s: &StreamDescriptor) -> String {
    let mut line = s.name.clone();
    if !s.stream_type.is_empty() {
        let _ = write!(line, " [{}]", s.stream_type);
    }
    let _ = write!(
        line,
        " {} ch @ {}",
        s.channel_count,
        format_rate(s.nominal_srate)
    );
    if !s.hostname.is_empty() {
        let _ = write!(line, " on {}", s.hostname);
    }
    line
}

fn list_streams(monitor: &CliMonitor, settings: &Settings) {
    let snapshot = monitor.snapshot();
    let mut out = String::new();
    for descriptor in snapshot.values().take(settings.max_entries) {
        out.push_str(&stream_detail(descriptor, settings.color));
        out.push_str("\n\n");
    }
    out.push_str(&count_line(snapshot.len()));
    output::print_output(&out, settings.quiet);
}

fn status(settings: &Settings, message: &str) {
    if !settings.quiet {
        eprintln!("{}", output::dim(message, settings.color));
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
