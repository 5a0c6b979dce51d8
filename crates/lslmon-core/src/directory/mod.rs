// ── Stream directory seam ──
//
// The monitor never talks to the network itself. It asks a
// `StreamDirectory` which streams are visible and asks it to open a
// handle on each new one. Implementations: the HTTP directory service,
// liblsl (feature `lsl`), and the `ForgetAfter` decorator over either.

mod forget;
mod http;
#[cfg(feature = "lsl")]
mod lsl;

use std::future::Future;
use std::time::Duration;

use crate::config::DirectoryConfig;
use crate::error::CoreError;
use crate::model::ResolvedStream;

pub use forget::ForgetAfter;
pub use http::{HttpDirectory, HttpStreamHandle};
#[cfg(feature = "lsl")]
pub use lsl::{LslDirectory, LslStreamHandle};

/// An open connection to one stream, kept while the stream is registered.
pub trait StreamHandle: Send + Sync + 'static {
    /// The stream's full XML info document.
    fn info_xml(&self) -> &str;

    /// Release the underlying connection. Called exactly once, when the
    /// stream is evicted or the monitor shuts down.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

/// Source of stream resolutions and handles.
pub trait StreamDirectory: Send + Sync + 'static {
    type Handle: StreamHandle;

    /// Streams visible right now. May take up to `wait` to aggregate.
    fn resolve(
        &self,
        wait: Duration,
    ) -> impl Future<Output = Result<Vec<ResolvedStream>, CoreError>> + Send;

    /// Open a handle on a stream returned by [`resolve`](Self::resolve).
    fn connect(
        &self,
        stream: &ResolvedStream,
    ) -> impl Future<Output = Result<Self::Handle, CoreError>> + Send;
}

/// Directory chosen at runtime from configuration.
pub enum AnyDirectory {
    Http(HttpDirectory),
    #[cfg(feature = "lsl")]
    Lsl(LslDirectory),
}

/// Handle type of [`AnyDirectory`].
pub enum AnyHandle {
    Http(HttpStreamHandle),
    #[cfg(feature = "lsl")]
    Lsl(LslStreamHandle),
}

impl AnyDirectory {
    /// Build the directory described by `config`.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self, CoreError> {
        match config {
            DirectoryConfig::Http(endpoint) => Ok(Self::Http(HttpDirectory::new(endpoint)?)),
            #[cfg(feature = "lsl")]
            DirectoryConfig::Lsl { connect_timeout } => {
                Ok(Self::Lsl(LslDirectory::new(*connect_timeout)))
            }
            #[cfg(not(feature = "lsl"))]
            DirectoryConfig::Lsl { .. } => Err(CoreError::Unsupported {
                backend: "lsl".into(),
                required: "a build with the `lsl` feature".into(),
            }),
        }
    }
}

impl StreamDirectory for AnyDirectory {
    type Handle = AnyHandle;

    async fn resolve(&self, wait: Duration) -> Result<Vec<ResolvedStream>, CoreError> {
        match self {
            Self::Http(d) => d.resolve(wait).await,
            #[cfg(feature = "lsl")]
            Self::Lsl(d) => d.resolve(wait).await,
        }
    }

    async fn connect(&self, stream: &ResolvedStream) -> Result<AnyHandle, CoreError> {
        match self {
            Self::Http(d) => d.connect(stream).await.map(AnyHandle::Http),
            #[cfg(feature = "lsl")]
            Self::Lsl(d) => d.connect(stream).await.map(AnyHandle::Lsl),
        }
    }
}

impl StreamHandle for AnyHandle {
    fn info_xml(&self) -> &str {
        match self {
            Self::Http(h) => h.info_xml(),
            #[cfg(feature = "lsl")]
            Self::Lsl(h) => h.info_xml(),
        }
    }

    fn close(self) {
        match self {
            Self::Http(h) => h.close(),
            #[cfg(feature = "lsl")]
            Self::Lsl(h) => h.close(),
        }
    }
}
