// ── Registry of live watchers ──
//
// Maps each visible stream's identity to the watcher holding its open
// handle and parsed descriptor. Owned by the monitor behind the cycle
// lock; readers only ever see the `Arc` snapshots published through the
// watch channel, once per cycle that changed something.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::directory::{StreamDirectory, StreamHandle};
use crate::error::CoreError;
use crate::model::{
    DescriptorMap, RegistrySnapshot, ResolvedStream, StreamDescriptor, StreamIdentity, StreamInfo,
};

// ── Watcher ─────────────────────────────────────────────────────────

/// One registered stream: its resolution record, parsed metadata, and
/// the handle kept open until eviction.
pub struct Watcher<H> {
    resolved: ResolvedStream,
    descriptor: Arc<StreamDescriptor>,
    handle: H,
}

impl<H: StreamHandle> Watcher<H> {
    /// Connect to `stream` and parse its info document.
    ///
    /// Connection failures are returned; unparseable metadata is not: the
    /// watcher then carries a degraded descriptor built from `stream`.
    pub async fn open<D>(directory: &D, stream: &ResolvedStream) -> Result<Self, CoreError>
    where
        D: StreamDirectory<Handle = H>,
    {
        let handle = directory.connect(stream).await?;
        let descriptor = match StreamDescriptor::from_xml(handle.info_xml()) {
            Ok(descriptor) => descriptor,
            Err(source) => {
                let err = CoreError::MalformedMetadata {
                    stream: stream.name.clone(),
                    source,
                };
                warn!(stream = %stream.name, error = %err, "using resolution record as metadata");
                StreamDescriptor::degraded(stream, err.to_string())
            }
        };

        Ok(Self {
            resolved: stream.clone(),
            descriptor: Arc::new(descriptor),
            handle,
        })
    }

    pub fn descriptor(&self) -> &Arc<StreamDescriptor> {
        &self.descriptor
    }

    pub fn resolved(&self) -> &ResolvedStream {
        &self.resolved
    }

    /// Close the handle, keeping the descriptor for the change report.
    pub fn close(self) -> Arc<StreamDescriptor> {
        self.handle.close();
        self.descriptor
    }
}

/// Keyed by the name captured at resolution time, so a descriptor whose
/// `<name>` disagrees cannot move the watcher to another key.
impl<H> StreamInfo for Watcher<H> {
    fn name(&self) -> &str {
        &self.resolved.name
    }
}

// ── Cycle planning ──────────────────────────────────────────────────

/// What a cycle has to do, computed from one resolution result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CyclePlan {
    /// The result list with duplicate identities dropped.
    pub resolved: Vec<ResolvedStream>,
    /// Streams with no watcher yet, in resolution order.
    pub to_add: Vec<ResolvedStream>,
    /// Registered identities absent from the result.
    pub to_remove: Vec<StreamIdentity>,
}

// ── Registry ────────────────────────────────────────────────────────

pub struct StreamRegistry<H> {
    watchers: IndexMap<StreamIdentity, Watcher<H>>,
    publisher: watch::Sender<RegistrySnapshot>,
}

impl<H: StreamHandle> Default for StreamRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: StreamHandle> StreamRegistry<H> {
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(RegistrySnapshot::default());
        Self {
            watchers: IndexMap::new(),
            publisher,
        }
    }

    /// Receiver for the snapshots this registry publishes.
    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.publisher.subscribe()
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.watchers.contains_key(identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = &StreamIdentity> {
        self.watchers.keys()
    }

    /// Diff a resolution result against the registered streams.
    pub fn plan(&self, resolved: Vec<ResolvedStream>) -> CyclePlan {
        let mut seen = HashSet::with_capacity(resolved.len());
        let mut plan = CyclePlan::default();

        for stream in resolved {
            let identity = stream.identity();
            if !seen.insert(identity.clone()) {
                debug!(stream = %identity, "duplicate identity in resolution, ignoring");
                continue;
            }
            if !self.watchers.contains_key(&identity) {
                plan.to_add.push(stream.clone());
            }
            plan.resolved.push(stream);
        }

        plan.to_remove = self
            .watchers
            .keys()
            .filter(|identity| !seen.contains(*identity))
            .cloned()
            .collect();

        plan
    }

    /// Remove, then insert, then publish one snapshot and close the
    /// removed handles. Returns the added and removed descriptors.
    ///
    /// Added watchers whose identity is already registered are closed
    /// and dropped; the existing watcher wins.
    pub fn apply(
        &mut self,
        to_remove: &[StreamIdentity],
        added: Vec<Watcher<H>>,
    ) -> (DescriptorMap, DescriptorMap) {
        let evicted: Vec<(StreamIdentity, Watcher<H>)> = to_remove
            .iter()
            .filter_map(|identity| self.watchers.shift_remove_entry(identity.as_str()))
            .collect();

        let mut inserted = DescriptorMap::new();
        for watcher in added {
            let identity = watcher.identity();
            if self.watchers.contains_key(&identity) {
                watcher.close();
                continue;
            }
            inserted.insert(identity.clone(), Arc::clone(watcher.descriptor()));
            self.watchers.insert(identity, watcher);
        }

        if !evicted.is_empty() || !inserted.is_empty() {
            self.publish();
        }

        let removed = evicted
            .into_iter()
            .map(|(identity, watcher)| (identity, watcher.close()))
            .collect();

        (inserted, removed)
    }

    /// Evict every watcher, closing all handles.
    pub fn clear(&mut self) -> DescriptorMap {
        if self.watchers.is_empty() {
            return DescriptorMap::new();
        }
        let evicted = std::mem::take(&mut self.watchers);
        self.publish();
        evicted
            .into_iter()
            .map(|(identity, watcher)| (identity, watcher.close()))
            .collect()
    }

    /// Descriptor map of the current watchers.
    pub fn snapshot(&self) -> RegistrySnapshot {
        Arc::new(
            self.watchers
                .iter()
                .map(|(identity, watcher)| (identity.clone(), Arc::clone(watcher.descriptor())))
                .collect(),
        )
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot());
    }
}
