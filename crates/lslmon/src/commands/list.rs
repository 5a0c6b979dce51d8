//! `lslmon list`: one discovery cycle, then a summary of every stream.

use tabled::Tabled;

use lslmon_core::StreamDescriptor;

use super::{build_monitor, count_line, format_rate};
use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct StreamRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    stream_type: String,
    #[tabled(rename = "Channels")]
    channels: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Host")]
    host: String,
}

impl From<&&StreamDescriptor> for StreamRow {
    fn from(s: &&StreamDescriptor) -> Self {
        let channels = if s.channel_format.is_empty() {
            s.channel_count.to_string()
        } else {
            format!("{} ({})", s.channel_count, s.channel_format)
        };
        Self {
            name: s.name.clone(),
            stream_type: s.stream_type.clone(),
            channels,
            rate: format_rate(s.nominal_srate),
            source: s.source_id.clone(),
            host: s.hostname.clone(),
        }
    }
}

pub async fn handle(settings: &Settings) -> Result<(), CliError> {
    let monitor = build_monitor(settings)?;
    monitor.poll_once().await;
    let snapshot = monitor.snapshot();
    monitor.shutdown().await;

    let streams: Vec<&StreamDescriptor> = snapshot
        .values()
        .map(AsRef::as_ref)
        .take(settings.max_entries)
        .collect();

    if settings.output == OutputFormat::Table {
        let mut out = String::new();
        if !streams.is_empty() {
            out = output::render_list(settings.output, &streams, |s| StreamRow::from(s), |s| {
                s.name.clone()
            })?;
            out.push('\n');
        }
        out.push_str(&count_line(snapshot.len()));
        if snapshot.len() > streams.len() {
            out.push_str(&format!(" (showing {})", streams.len()));
        }
        output::print_output(&out, settings.quiet);
        return Ok(());
    }

    let out = output::render_list(settings.output, &streams, |s| StreamRow::from(s), |s| {
        s.name.clone()
    })?;
    output::print_output(&out, settings.quiet);
    Ok(())
}
