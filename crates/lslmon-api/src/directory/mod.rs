// HTTP stream directory surface.

pub mod client;
pub mod models;

pub use client::DirectoryClient;
pub use models::StreamRecord;
