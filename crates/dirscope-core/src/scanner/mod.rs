/// Scanner module: builds a disk-usage tree from a root path.
///
/// Two entry points share the same walker:
/// - [`scan`] / [`scan_with_probe`] run on the calling thread and return the tree.
/// - [`start_scan`] runs on a background thread and reports through a
///   [`ScanHandle`] (progress channel plus cancellation flag).
///
/// Entries below the root that cannot be inspected are logged, recorded as
/// [`ScanIssue`]s and left out; only a root that cannot be inspected (or a
/// cancellation) fails the scan.
pub mod progress;
mod walker;

use crate::error::ScanError;
use crate::ignore::{IgnoreRules, DEFAULT_IGNORE_FILE};
use crate::model::FileTree;
use crate::platform::{default_probe, DiskUsageProbe};
use progress::ScanProgress;
use walker::Walker;

use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Maximum number of progress messages that may queue up in the channel.
///
/// Periodic updates and per-entry errors are dropped rather than blocking the
/// walker when the receiver falls behind; terminal messages always get through.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Stack size for walker threads. Recursion depth follows directory depth.
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// What to scan and how.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory (or single file) to scan.
    pub root: PathBuf,
    /// Ignore-rule files that must exist and parse.
    pub ignore_files: Vec<PathBuf>,
    /// Ignore-rule file used only if present.
    pub default_ignore_file: Option<PathBuf>,
    /// Entries with a logical size strictly below this are hidden (but counted).
    pub size_threshold: u64,
    /// Sort every child list by descending size-on-disk after the walk.
    pub sort_by_size: bool,
    /// Worker threads; `0` picks twice the logical CPU count.
    pub threads: usize,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_files: Vec::new(),
            default_ignore_file: Some(PathBuf::from(DEFAULT_IGNORE_FILE)),
            size_threshold: 0,
            sort_by_size: false,
            threads: 0,
        }
    }

    pub fn with_ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_files.push(path.into());
        self
    }

    pub fn without_default_ignore_file(mut self) -> Self {
        self.default_ignore_file = None;
        self
    }

    pub fn with_size_threshold(mut self, bytes: u64) -> Self {
        self.size_threshold = bytes;
        self
    }

    pub fn sorted_by_size(mut self, sort: bool) -> Self {
        self.sort_by_size = sort;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    fn worker_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get() * 2
        } else {
            self.threads
        }
    }
}

/// A non-fatal problem encountered below the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Result of a completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    pub tree: FileTree,
    pub issues: Vec<ScanIssue>,
    pub duration: Duration,
}

/// Scan on the calling thread with the platform's disk-usage probe.
pub fn scan(options: &ScanOptions) -> Result<ScanOutcome, ScanError> {
    scan_with_probe(options, default_probe())
}

/// Scan on the calling thread with a caller-supplied probe.
pub fn scan_with_probe(
    options: &ScanOptions,
    probe: &dyn DiskUsageProbe,
) -> Result<ScanOutcome, ScanError> {
    run_scan(options, probe, &AtomicBool::new(false), None)
}

fn run_scan(
    options: &ScanOptions,
    probe: &dyn DiskUsageProbe,
    cancel: &AtomicBool,
    progress: Option<&Sender<ScanProgress>>,
) -> Result<ScanOutcome, ScanError> {
    let start = Instant::now();
    info!("Starting scan of {}", options.root.display());

    let rules = IgnoreRules::load(&options.ignore_files, options.default_ignore_file.as_deref())?;
    if !rules.is_empty() {
        debug!("Ignore rules:\n{rules}");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.worker_count())
        .stack_size(WORKER_STACK_SIZE)
        .thread_name(|i| format!("dirscope-walk-{i}"))
        .build()
        .map_err(|e| ScanError::Thread(e.to_string()))?;

    let walker = Walker::new(&rules, probe, options.size_threshold, cancel, progress);
    let pending = pool.install(|| walker.walk_root(&options.root))?;

    let mut tree = pending.into_tree(walker.entries_found() as usize);
    if options.sort_by_size {
        tree.sort_children_by_size_on_disk();
    }
    let issues = walker.into_issues();
    let duration = start.elapsed();

    info!(
        "Scan complete: {} nodes, {} bytes, {} issues in {duration:?}",
        tree.len(),
        tree.total_size(),
        issues.len()
    );
    Ok(ScanOutcome {
        tree,
        issues,
        duration,
    })
}

/// Handle to a running or completed background scan.
pub struct ScanHandle {
    /// Receiver for progress updates from the scan thread.
    pub progress_rx: Receiver<ScanProgress>,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Join handle for the scan thread.
    _thread: thread::JoinHandle<()>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Start a new scan on a background thread.
///
/// The thread always finishes with exactly one terminal message:
/// `Complete`, `Failed` or `Cancelled`.
pub fn start_scan(options: ScanOptions) -> Result<ScanHandle, ScanError> {
    start_scan_with_probe(options, default_probe())
}

/// [`start_scan`] with a caller-supplied probe.
pub fn start_scan_with_probe(
    options: ScanOptions,
    probe: &'static dyn DiskUsageProbe,
) -> Result<ScanHandle, ScanError> {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();

    let thread = thread::Builder::new()
        .name("dirscope-scanner".into())
        .spawn(move || {
            let message = match run_scan(&options, probe, &cancel_clone, Some(&progress_tx)) {
                Ok(outcome) => ScanProgress::Complete {
                    error_count: outcome.issues.len() as u64,
                    duration: outcome.duration,
                    tree: Box::new(outcome.tree),
                },
                Err(ScanError::Cancelled) => {
                    info!("Scan of {} cancelled", options.root.display());
                    ScanProgress::Cancelled
                }
                Err(err) => {
                    tracing::error!("Scan of {} failed: {err}", options.root.display());
                    ScanProgress::Failed {
                        message: err.to_string(),
                    }
                }
            };
            let _ = progress_tx.send(message);
        })
        .map_err(|e| ScanError::Thread(e.to_string()))?;

    Ok(ScanHandle {
        progress_rx,
        cancel_flag,
        _thread: thread,
    })
}
