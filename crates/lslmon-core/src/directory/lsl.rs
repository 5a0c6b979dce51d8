// liblsl backend. Every liblsl call blocks, so each one is moved onto
// tokio's blocking pool.

use std::time::Duration;

use lslmon_api::liblsl::{self, InletHandle};
use tracing::debug;

use super::{StreamDirectory, StreamHandle};
use crate::error::CoreError;
use crate::model::ResolvedStream;

/// Directory backed by the native LSL network.
pub struct LslDirectory {
    connect_timeout: Duration,
}

impl LslDirectory {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl StreamDirectory for LslDirectory {
    type Handle = LslStreamHandle;

    async fn resolve(&self, wait: Duration) -> Result<Vec<ResolvedStream>, CoreError> {
        let records = tokio::task::spawn_blocking(move || liblsl::resolve_all(wait))
            .await
            .map_err(|e| CoreError::Internal(format!("resolver task failed: {e}")))??;
        Ok(records.into_iter().map(ResolvedStream::from).collect())
    }

    async fn connect(&self, stream: &ResolvedStream) -> Result<LslStreamHandle, CoreError> {
        let uid = stream.uid.clone();
        let timeout = self.connect_timeout;
        let inlet = tokio::task::spawn_blocking(move || InletHandle::open(&uid, timeout))
            .await
            .map_err(|e| CoreError::Internal(format!("inlet task failed: {e}")))?
            .map_err(|e| CoreError::connection(&stream.name, e))?;
        Ok(LslStreamHandle {
            uid: stream.uid.clone(),
            inlet,
        })
    }
}

/// An open liblsl inlet.
pub struct LslStreamHandle {
    uid: String,
    inlet: InletHandle,
}

impl StreamHandle for LslStreamHandle {
    fn info_xml(&self) -> &str {
        self.inlet.xml()
    }

    fn close(self) {
        debug!(uid = %self.uid, "closing inlet");
        self.inlet.close();
    }
}
