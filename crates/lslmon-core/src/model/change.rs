// ── Change notification ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use super::descriptor::StreamDescriptor;
use super::identity::StreamIdentity;
use super::resolved::ResolvedStream;

/// Identity → descriptor, in discovery order.
pub type DescriptorMap = IndexMap<StreamIdentity, Arc<StreamDescriptor>>;

/// Immutable view of the registry.
pub type RegistrySnapshot = Arc<DescriptorMap>;

/// What one resolution cycle did to the registry.
///
/// Only produced when the cycle added or removed at least one stream.
/// `added` and `removed` are disjoint.
#[derive(Debug, Clone, Serialize)]
pub struct StreamChange {
    /// Full result list of the cycle, after de-duplication.
    pub resolved: Vec<ResolvedStream>,
    pub added: DescriptorMap,
    pub removed: DescriptorMap,
    /// Registry size once the cycle was applied.
    pub streams: usize,
    pub observed_at: DateTime<Utc>,
}

impl StreamChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
