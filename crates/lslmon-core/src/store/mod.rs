// ── Stream registry ──

mod registry;

pub use registry::{CyclePlan, StreamRegistry, Watcher};
