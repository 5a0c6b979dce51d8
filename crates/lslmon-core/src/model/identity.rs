// ── Stream identity ──
//
// The registry key, and the one capability shared by everything that
// describes a stream: raw resolution results, parsed descriptors and
// registry watchers all answer `name()` / `identity()` through the
// `StreamInfo` trait.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Registry key for a stream. Unique within one resolution cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamIdentity(String);

impl StreamIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StreamIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for StreamIdentity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StreamIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Anything that names a stream.
///
/// Streams are keyed by name. Implementors only provide `name()`;
/// overriding `identity()` is reserved for types that captured their
/// identity at resolution time.
pub trait StreamInfo {
    fn name(&self) -> &str;

    fn identity(&self) -> StreamIdentity {
        StreamIdentity::new(self.name())
    }
}
