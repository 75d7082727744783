/// Logical and allocated size of a filesystem entry.
///
/// The scanner only ever talks to the [`DiskUsageProbe`] trait, so tests (or
/// callers scanning unusual filesystems) can swap in their own rounding rule.
use std::fs::Metadata;
use std::io;

/// Size of one allocation block as counted by `st_blocks` on Unix.
#[cfg(unix)]
pub const UNIX_BLOCK_SIZE: u64 = 512;

/// Allocation unit assumed where the platform reports no block count.
pub const DEFAULT_CLUSTER_SIZE: u64 = 4096;

/// Computes sizes from entry metadata. Must be a pure function of `metadata`.
pub trait DiskUsageProbe: Send + Sync {
    /// Logical length of the entry in bytes.
    fn size(&self, metadata: &Metadata) -> io::Result<u64>;

    /// Bytes actually allocated for the entry.
    fn size_on_disk(&self, metadata: &Metadata) -> io::Result<u64>;
}

/// Uses the block count reported by `lstat`.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockProbe;

#[cfg(unix)]
impl DiskUsageProbe for BlockProbe {
    fn size(&self, metadata: &Metadata) -> io::Result<u64> {
        Ok(metadata.len())
    }

    fn size_on_disk(&self, metadata: &Metadata) -> io::Result<u64> {
        use std::os::unix::fs::MetadataExt;
        Ok(metadata.blocks() * UNIX_BLOCK_SIZE)
    }
}

/// Rounds the logical size up to a whole number of clusters.
#[derive(Debug, Clone, Copy)]
pub struct ClusterProbe {
    pub cluster_size: u64,
}

impl ClusterProbe {
    pub const DEFAULT: Self = Self {
        cluster_size: DEFAULT_CLUSTER_SIZE,
    };

    /// Round `size` up to the next cluster boundary.
    pub fn round_up(&self, size: u64) -> u64 {
        if self.cluster_size == 0 {
            return size;
        }
        size.div_ceil(self.cluster_size) * self.cluster_size
    }
}

impl Default for ClusterProbe {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl DiskUsageProbe for ClusterProbe {
    fn size(&self, metadata: &Metadata) -> io::Result<u64> {
        Ok(metadata.len())
    }

    fn size_on_disk(&self, metadata: &Metadata) -> io::Result<u64> {
        Ok(self.round_up(metadata.len()))
    }
}

#[cfg(unix)]
static NATIVE_PROBE: BlockProbe = BlockProbe;

#[cfg(not(unix))]
static NATIVE_PROBE: ClusterProbe = ClusterProbe::DEFAULT;

/// The probe matching the current platform.
pub fn default_probe() -> &'static dyn DiskUsageProbe {
    &NATIVE_PROBE
}
