// ── Domain model ──

pub mod change;
pub mod descriptor;
pub mod identity;
pub mod resolved;

pub use change::{DescriptorMap, RegistrySnapshot, StreamChange};
pub use descriptor::{DescEntry, DescValue, Description, MetadataError, StreamDescriptor};
pub use identity::{StreamIdentity, StreamInfo};
pub use resolved::ResolvedStream;
