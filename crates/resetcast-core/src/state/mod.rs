//! State store implementations
//!
//! Watermark stores (memory and file-backed) plus a file-backed stand-in for
//! the external target registration store, used by the daemon and by tests.

pub mod file;
pub mod memory;
pub mod targets;

pub use file::FileWatermarkStore;
pub use memory::MemoryWatermarkStore;
pub use targets::FileTargetRegistry;
