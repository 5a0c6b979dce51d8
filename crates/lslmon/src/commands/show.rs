//! `lslmon show <name>`: full metadata of one stream.

use std::fmt::Write as _;

use lslmon_core::{DescEntry, DescValue, StreamDescriptor};

use super::{build_monitor, format_rate};
use crate::cli::ShowArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ShowArgs, settings: &Settings) -> Result<(), CliError> {
    let monitor = build_monitor(settings)?;
    monitor.poll_once().await;
    let found = monitor.get(&args.name);
    monitor.shutdown().await;

    let descriptor = found.ok_or(CliError::StreamNotFound { name: args.name })?;
    let out = output::render_single(
        settings.output,
        descriptor.as_ref(),
        |s| stream_detail(s, settings.color),
        |s| s.name.clone(),
    )?;
    output::print_output(&out, settings.quiet);
    Ok(())
}

/// Multi-line description of a stream: identity line, format lines,
/// then the `<desc>` channels and remaining entries.
pub fn stream_detail(s: &StreamDescriptor, color: bool) -> String {
    let mut out = String::new();

    let _ = write!(out, "{}", s.name);
    if !s.source_id.is_empty() {
        let _ = write!(out, " ({})", s.source_id);
    }
    let mut location = s.hostname.clone();
    if let Some(ref addr) = s.v4address {
        let _ = write!(location, "@{addr}");
    }
    if let (Some(data), Some(service)) = (s.v4data_port, s.v4service_port) {
        let _ = write!(location, ":{data}/{service}");
    }
    if !location.is_empty() {
        let _ = write!(out, " {location}");
    }
    out.push('\n');

    let _ = writeln!(out, "\t{} @{}", s.stream_type, format_rate(s.nominal_srate));
    let plural = if s.channel_count == 1 { "" } else { "s" };
    let _ = write!(out, "\t{} channel{plural}", s.channel_count);
    if !s.channel_format.is_empty() {
        let _ = write!(out, " ({})", s.channel_format);
    }
    out.push('\n');

    if let Some(ref reason) = s.metadata_error {
        let _ = write!(
            out,
            "\t{}",
            output::dim(&format!("metadata unavailable: {reason}"), color)
        );
        return out;
    }

    let _ = write!(
        out,
        "\tCreated at {:.3}, Version {:.1}",
        s.created_at, s.version
    );

    if let Some(ref desc) = s.description {
        if !desc.channels.is_empty() {
            out.push_str("\n\tChannels:");
            for channel in &desc.channels {
                let fields: Vec<String> = channel.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                let _ = write!(out, "\n\t\t{}", fields.join(", "));
            }
        }
        if !desc.entries.is_empty() {
            out.push_str("\n\tOther info:");
            write_entries(&mut out, &desc.entries, 2);
        }
    }
    out
}

fn write_entries(out: &mut String, entries: &[DescEntry], depth: usize) {
    let indent = "\t".repeat(depth);
    for entry in entries {
        match entry.value {
            DescValue::Text(ref text) => {
                let _ = write!(out, "\n{indent}{}: {text}", entry.key);
            }
            DescValue::Group(ref children) => {
                let _ = write!(out, "\n{indent}{}:", entry.key);
                write_entries(out, children, depth + 1);
            }
        }
    }
}
