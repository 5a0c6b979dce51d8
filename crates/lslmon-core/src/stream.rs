// ── Reactive registry stream ──
//
// Subscription handle for consuming registry snapshots.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::RegistrySnapshot;

/// A subscription to the stream registry.
///
/// Provides point-in-time snapshot access and change notification via
/// `changed()` or by converting to a `Stream`. A new snapshot is
/// published once per cycle that added or removed streams.
pub struct RegistryStream {
    current: RegistrySnapshot,
    receiver: watch::Receiver<RegistrySnapshot>,
}

impl RegistryStream {
    pub(crate) fn new(receiver: watch::Receiver<RegistrySnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time or by the last `changed()`.
    pub fn current(&self) -> &RegistrySnapshot {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> RegistrySnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the monitor has been dropped.
    pub async fn changed(&mut self) -> Option<RegistrySnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    /// The first item is the snapshot current at conversion time.
    pub fn into_stream(self) -> RegistryWatchStream {
        RegistryWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct RegistryWatchStream {
    inner: WatchStream<RegistrySnapshot>,
}

impl Stream for RegistryWatchStream {
    type Item = RegistrySnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
