// ── Resolution result domain type ──

use serde::{Deserialize, Serialize};

use lslmon_api::StreamRecord;

use super::identity::StreamInfo;

/// A stream returned by one resolution of the directory.
///
/// Carries what the directory advertises without connecting: enough to
/// key the registry, to open a handle, and to build a degraded
/// descriptor when the stream's own metadata cannot be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStream {
    pub uid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub stream_type: String,
    pub channel_count: u32,
    pub nominal_srate: f64,
    pub source_id: String,
    pub hostname: String,
}

impl ResolvedStream {
    /// Minimal record, mostly useful for directories that only know names.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            uid: String::new(),
            name: name.into(),
            stream_type: String::new(),
            channel_count: 0,
            nominal_srate: 0.0,
            source_id: String::new(),
            hostname: String::new(),
        }
    }
}

impl StreamInfo for ResolvedStream {
    fn name(&self) -> &str {
        &self.name
    }
}

impl From<StreamRecord> for ResolvedStream {
    fn from(r: StreamRecord) -> Self {
        Self {
            uid: r.uid,
            name: r.name,
            stream_type: r.stream_type,
            channel_count: r.channel_count,
            nominal_srate: r.nominal_srate,
            source_id: r.source_id,
            hostname: r.hostname,
        }
    }
}
