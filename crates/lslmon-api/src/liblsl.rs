// liblsl resolver
//
// Thin blocking wrappers over the `lsl` crate. Every call here may block
// the current thread for up to its timeout; async callers must move them
// onto the blocking pool.

use std::time::Duration;

use tracing::debug;

use crate::directory::StreamRecord;
use crate::error::Error;

/// Inlet buffer length in seconds. Samples are never pulled, so this only
/// bounds what liblsl would queue if the inlet were ever opened for data.
const INLET_MAX_BUFLEN: i32 = 1;

/// Resolve every stream visible on the network within `wait`.
pub fn resolve_all(wait: Duration) -> Result<Vec<StreamRecord>, Error> {
    let infos = lsl::resolve_streams(wait.as_secs_f64()).map_err(lsl_error)?;
    debug!(count = infos.len(), "liblsl resolution finished");
    Ok(infos.iter().map(record_from_info).collect())
}

/// An open inlet kept alive while its stream stays in the registry.
pub struct InletHandle {
    inlet: lsl::StreamInlet,
    xml: String,
}

impl InletHandle {
    /// Re-resolve the stream by uid, open an inlet and read its full info
    /// (including the `<desc>` element, which resolution alone omits).
    pub fn open(uid: &str, timeout: Duration) -> Result<Self, Error> {
        let found = lsl::resolve_byprop("uid", uid, 1, timeout.as_secs_f64()).map_err(lsl_error)?;
        let Some(info) = found.into_iter().next() else {
            return Err(Error::Lsl(format!("stream {uid} is no longer advertised")));
        };

        let inlet = lsl::StreamInlet::new(&info, INLET_MAX_BUFLEN, 0, true).map_err(lsl_error)?;
        let full = inlet.info(timeout.as_secs_f64()).map_err(lsl_error)?;
        let xml = full.to_xml().map_err(lsl_error)?;

        Ok(Self { inlet, xml })
    }

    /// The stream's XML info document.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Drop the inlet, releasing its liblsl connection.
    pub fn close(self) {
        let Self { inlet, .. } = self;
        drop(inlet);
    }
}

fn record_from_info(info: &lsl::StreamInfo) -> StreamRecord {
    StreamRecord {
        uid: info.uid(),
        name: info.stream_name(),
        stream_type: info.stream_type(),
        channel_count: u32::try_from(info.channel_count()).unwrap_or(0),
        nominal_srate: info.nominal_srate(),
        source_id: info.source_id(),
        hostname: info.hostname(),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn lsl_error(err: lsl::Error) -> Error {
    Error::Lsl(format!("{err:?}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_resolution_fields() {
        let info = lsl::StreamInfo::new(
            "BioSemi",
            "EEG",
            8,
            512.0,
            lsl::ChannelFormat::Float32,
            "biosemi-1",
        )
        .unwrap();

        let record = record_from_info(&info);
        assert_eq!(record.name, "BioSemi");
        assert_eq!(record.stream_type, "EEG");
        assert_eq!(record.channel_count, 8);
        assert!((record.nominal_srate - 512.0).abs() < f64::EPSILON);
        assert_eq!(record.source_id, "biosemi-1");
    }

    #[test]
    fn irregular_stream_keeps_zero_rate() {
        let info = lsl::StreamInfo::new(
            "Markers",
            "Markers",
            1,
            0.0,
            lsl::ChannelFormat::Float32,
            "",
        )
        .unwrap();

        let record = record_from_info(&info);
        assert_eq!(record.channel_count, 1);
        assert!(record.nominal_srate.abs() < f64::EPSILON);
        assert!(record.source_id.is_empty());
    }
}
