// Grace window over another directory.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::StreamDirectory;
use crate::error::CoreError;
use crate::model::{ResolvedStream, StreamIdentity, StreamInfo};

/// Keeps reporting a stream until it has gone unseen for `window`.
///
/// Smooths over streams that miss a single resolution. A failed
/// resolution of the inner directory counts as seeing nothing, so
/// remembered streams survive short directory outages too.
pub struct ForgetAfter<D> {
    inner: D,
    window: Duration,
    seen: Mutex<IndexMap<StreamIdentity, (ResolvedStream, Instant)>>,
}

impl<D> ForgetAfter<D> {
    /// A zero `window` makes the wrapper a pure passthrough.
    pub fn new(inner: D, window: Duration) -> Self {
        Self {
            inner,
            window,
            seen: Mutex::new(IndexMap::new()),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn remember(&self, fresh: Vec<ResolvedStream>) -> Vec<ResolvedStream> {
        let now = Instant::now();
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);

        for stream in fresh {
            match seen.get_mut(stream.name()) {
                // Duplicate within this resolution: first occurrence wins.
                Some((_, last_seen)) if *last_seen == now => {}
                Some(entry) => *entry = (stream, now),
                None => {
                    seen.insert(stream.identity(), (stream, now));
                }
            }
        }
        seen.retain(|identity, (_, last_seen)| {
            let keep = now.duration_since(*last_seen) < self.window;
            if !keep {
                debug!(stream = %identity, "forgetting stream");
            }
            keep
        });

        seen.values().map(|(stream, _)| stream.clone()).collect()
    }
}

impl<D: StreamDirectory> StreamDirectory for ForgetAfter<D> {
    type Handle = D::Handle;

    async fn resolve(&self, wait: Duration) -> Result<Vec<ResolvedStream>, CoreError> {
        if self.window.is_zero() {
            return self.inner.resolve(wait).await;
        }
        let fresh = match self.inner.resolve(wait).await {
            Ok(streams) => streams,
            Err(e) => {
                warn!(error = %e, "resolution failed, reporting remembered streams");
                Vec::new()
            }
        };
        Ok(self.remember(fresh))
    }

    async fn connect(&self, stream: &ResolvedStream) -> Result<D::Handle, CoreError> {
        self.inner.connect(stream).await
    }
}
