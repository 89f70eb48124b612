//! Disk usage from file metadata

use std::fs;
use std::path::Path;

use super::DiskUsage;
use crate::error::Result;

/// Reports file sizes straight from the filesystem
///
/// The data log never shrinks, so `DISK` grows monotonically even when keys
/// are deleted or overwritten.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDiskUsage;

impl DiskUsage for FsDiskUsage {
    fn size_of(&self, path: &Path) -> Result<u64> {
        Ok(fs::metadata(path)?.len())
    }
}
