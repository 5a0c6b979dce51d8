//! Stream discovery and registry layer between `lslmon-api` and the CLI.
//!
//! This crate owns the domain model, the directory seam and the
//! background discovery loop:
//!
//! - **[`Monitor`]** — Cheaply cloneable facade over one directory.
//!   [`start()`](Monitor::start) spawns the polling task,
//!   [`poll_once()`](Monitor::poll_once) runs a single cycle on demand, and
//!   [`stop()`](Monitor::stop) / [`shutdown()`](Monitor::shutdown) wind it
//!   down. Changes are delivered through a broadcast channel and an
//!   optional synchronous callback.
//!
//! - **[`StreamRegistry`]** — Identity → watcher map owned by the monitor.
//!   Publishes an immutable [`RegistrySnapshot`] through a
//!   `tokio::sync::watch` channel once per cycle that changed it.
//!
//! - **[`StreamDirectory`]** — The seam to the network. Implemented by
//!   [`HttpDirectory`], `LslDirectory` (feature `lsl`) and the
//!   [`ForgetAfter`] grace-window decorator.
//!
//! - **Domain model** ([`model`]) — [`ResolvedStream`] records, parsed
//!   [`StreamDescriptor`]s and the [`StreamChange`] notification, all keyed
//!   by [`StreamIdentity`] through the [`StreamInfo`] trait.

pub mod config;
pub mod directory;
pub mod error;
pub mod model;
pub mod monitor;
pub mod store;
pub mod stream;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DirectoryConfig, HttpEndpoint, MonitorConfig, TlsVerification};
pub use directory::{
    AnyDirectory, AnyHandle, ForgetAfter, HttpDirectory, StreamDirectory, StreamHandle,
};
#[cfg(feature = "lsl")]
pub use directory::{LslDirectory, LslStreamHandle};
pub use error::CoreError;
pub use monitor::{ChangeCallback, Monitor, MonitorState};
pub use store::{StreamRegistry, Watcher};
pub use stream::RegistryStream;

pub use model::{
    DescEntry, DescValue, Description, DescriptorMap, MetadataError, RegistrySnapshot,
    ResolvedStream, StreamChange, StreamDescriptor, StreamIdentity, StreamInfo,
};
