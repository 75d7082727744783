/// Platform-specific functionality: on-disk size probing and permission bits.

pub mod disk_usage;
pub mod permissions;

pub use disk_usage::{default_probe, ClusterProbe, DiskUsageProbe, DEFAULT_CLUSTER_SIZE};
#[cfg(unix)]
pub use disk_usage::{BlockProbe, UNIX_BLOCK_SIZE};
pub use permissions::file_mode;
