//! Monitor Module
//!
//! Collaborators the command dispatcher consults for `MEM` and `DISK`.
//!
//! Both are traits so the dispatcher can be driven by fixed values in tests.

mod disk;
mod memory;

use std::path::Path;

use crate::error::Result;

pub use disk::FsDiskUsage;
pub use memory::{check_limit, ProcessMemoryMonitor};

/// Source of the process's current memory usage
pub trait MemoryMonitor: Send + Sync {
    /// Resident bytes at the last sample
    fn current_bytes(&self) -> u64;
}

/// Source of on-disk file sizes
pub trait DiskUsage: Send + Sync {
    /// Size of one file in bytes
    fn size_of(&self, path: &Path) -> Result<u64>;

    /// Combined size of several files
    fn total(&self, paths: &[&Path]) -> Result<u64> {
        paths.iter().map(|path| self.size_of(path)).sum()
    }
}
