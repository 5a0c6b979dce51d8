// Wire types shared by every directory backend.

use serde::{Deserialize, Serialize};

/// A stream as advertised by a directory: enough to identify it and to
/// open a metadata handle for it later.
///
/// Missing string fields decode as empty, missing numbers as zero. The
/// full XML info document is fetched separately per stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Unique id assigned by the publishing outlet.
    #[serde(default)]
    pub uid: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub stream_type: String,
    #[serde(default)]
    pub channel_count: u32,
    /// Nominal sample rate in Hz. `0` means irregular rate.
    #[serde(default)]
    pub nominal_srate: f64,
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub hostname: String,
}
