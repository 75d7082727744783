/// Scan progress reporting: lightweight messages sent from the scan
/// thread to whoever holds the [`super::ScanHandle`].
use crate::model::FileTree;
use std::time::Duration;

/// Progress updates sent from the scan thread.
#[derive(Debug)]
pub enum ScanProgress {
    /// Periodic update with running totals.
    Update {
        files_found: u64,
        dirs_found: u64,
        total_size: u64,
        current_path: String,
    },
    /// A non-fatal error (e.g. permission denied on one entry).
    Error { path: String, message: String },
    /// Scanning completed; the tree is aggregated and, if requested, sorted.
    Complete {
        tree: Box<FileTree>,
        duration: Duration,
        error_count: u64,
    },
    /// The scan could not produce a tree (e.g. the root is unreadable).
    Failed { message: String },
    /// Scan was cancelled through the handle.
    Cancelled,
}

impl ScanProgress {
    /// `true` for the last message a scan ever sends.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }
}
