// lslmon-api: stream directory clients (HTTP directory service + liblsl)

pub mod directory;
pub mod error;
#[cfg(feature = "lsl")]
pub mod liblsl;
pub mod transport;

pub use directory::{DirectoryClient, StreamRecord};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
