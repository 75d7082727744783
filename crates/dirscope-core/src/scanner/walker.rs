/// Parallel recursive directory walker.
///
/// Every directory fans out one rayon task per entry (`par_iter` over its
/// listing) and joins them before the directory is considered complete. The
/// pool is bounded by [`super::ScanOptions::threads`], so very wide
/// directories queue work instead of spawning unbounded threads.
///
/// # No shared tree during the walk
///
/// Each task returns an owned [`PendingNode`] subtree. The parent merges the
/// joined results into its own task-local node: sizes are added for *every*
/// child found, but a child is only kept in the visible list when it clears
/// the size threshold and no ignore rule matches it. Nothing is locked across
/// a recursive call; the only shared state is atomics and the issue log.
/// The finished subtree is moved into the arena in one pre-order pass.
use super::progress::ScanProgress;
use super::ScanIssue;
use crate::error::ScanError;
use crate::ignore::IgnoreRules;
use crate::model::{FileNode, FileTree, NodeIndex};
use crate::platform::{file_mode, DiskUsageProbe};
use compact_str::CompactString;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, warn};

/// Entries between two `ScanProgress::Update` messages.
const UPDATE_INTERVAL: u64 = 1_000;

/// A walked subtree that has not been placed in an arena yet.
#[derive(Debug)]
pub(crate) struct PendingNode {
    pub node: FileNode,
    pub children: Vec<PendingNode>,
}

impl PendingNode {
    fn leaf(node: FileNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Move the subtree into a fresh arena, parents before children.
    pub(crate) fn into_tree(self, estimated_nodes: usize) -> FileTree {
        let mut tree = FileTree::with_capacity(self.node, estimated_nodes);
        let root = tree.root();
        attach(&mut tree, root, self.children);
        tree
    }
}

fn attach(tree: &mut FileTree, parent: NodeIndex, children: Vec<PendingNode>) {
    for PendingNode { node, children } in children {
        let idx = tree.add_child(parent, node);
        attach(tree, idx, children);
    }
}

/// Shared, read-mostly state for one walk.
pub(crate) struct Walker<'a> {
    rules: &'a IgnoreRules,
    probe: &'a dyn DiskUsageProbe,
    size_threshold: u64,
    cancel: &'a AtomicBool,
    progress: Option<&'a Sender<ScanProgress>>,
    files_found: AtomicU64,
    dirs_found: AtomicU64,
    bytes_found: AtomicU64,
    issues: Mutex<Vec<ScanIssue>>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        rules: &'a IgnoreRules,
        probe: &'a dyn DiskUsageProbe,
        size_threshold: u64,
        cancel: &'a AtomicBool,
        progress: Option<&'a Sender<ScanProgress>>,
    ) -> Self {
        Self {
            rules,
            probe,
            size_threshold,
            cancel,
            progress,
            files_found: AtomicU64::new(0),
            dirs_found: AtomicU64::new(0),
            bytes_found: AtomicU64::new(0),
            issues: Mutex::new(Vec::new()),
        }
    }

    /// Number of entries (files and directories) turned into nodes so far.
    pub(crate) fn entries_found(&self) -> u64 {
        self.files_found.load(Ordering::Relaxed) + self.dirs_found.load(Ordering::Relaxed)
    }

    /// Non-fatal problems recorded during the walk.
    pub(crate) fn into_issues(self) -> Vec<ScanIssue> {
        self.issues.into_inner()
    }

    /// Walk from the scan root. Any failure to inspect the root is fatal.
    pub(crate) fn walk_root(&self, root: &Path) -> Result<PendingNode, ScanError> {
        let root_err = |source| ScanError::Root {
            path: root.to_path_buf(),
            source,
        };
        let metadata = fs::symlink_metadata(root).map_err(root_err)?;
        let node = self
            .node_from_metadata(root_display_name(root), &metadata)
            .map_err(root_err)?;
        self.expand(root, node)
    }

    /// Walk an entry below the root. `Ok(None)` means the entry could not be
    /// inspected and contributes nothing to its parent.
    fn visit(&self, path: &Path, os_name: OsString) -> Result<Option<PendingNode>, ScanError> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(ScanError::Cancelled);
        }

        let (name, raw_name) = FileNode::split_os_name(os_name);
        let node = match fs::symlink_metadata(path)
            .and_then(|metadata| self.node_from_metadata(name, &metadata))
        {
            Ok(mut node) => {
                node.raw_name = raw_name;
                node
            }
            Err(err) => {
                self.record_issue(path, &err);
                return Ok(None);
            }
        };
        self.expand(path, node).map(Some)
    }

    /// Finish a node: leaves are returned as-is, directories are listed and
    /// their children walked in parallel, then merged.
    fn expand(&self, path: &Path, node: FileNode) -> Result<PendingNode, ScanError> {
        self.note_entry(path, &node);
        if !node.is_dir {
            return Ok(PendingNode::leaf(node));
        }

        let entries = match self.list_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                // Keep the directory, just without children.
                self.record_issue(path, &err);
                return Ok(PendingNode::leaf(node));
            }
        };

        let found: Vec<Option<PendingNode>> = entries
            .into_par_iter()
            .map(|(child_path, name)| self.visit(&child_path, name))
            .collect::<Result<_, _>>()?;

        let mut dir = PendingNode::leaf(node);
        for child in found.into_iter().flatten() {
            self.merge(path, &mut dir, child);
        }
        dir.children.sort_by(|a, b| {
            a.node
                .name
                .cmp(&b.node.name)
                .then_with(|| a.node.os_name().cmp(b.node.os_name()))
        });
        Ok(dir)
    }

    /// Fold a finished child into its parent: totals always, visibility only
    /// when the child passes the threshold and the ignore rules.
    fn merge(&self, dir_path: &Path, dir: &mut PendingNode, child: PendingNode) {
        dir.node.size += child.node.size;
        dir.node.size_on_disk += child.node.size_on_disk;

        if child.node.size < self.size_threshold {
            return;
        }
        if self.rules.should_ignore(&child.node.name, child.node.is_dir) {
            debug!("ignore: {}", dir_path.join(child.node.os_name()).display());
            return;
        }
        dir.children.push(child);
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<(PathBuf, OsString)>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            match entry {
                Ok(entry) => entries.push((entry.path(), entry.file_name())),
                Err(err) => self.record_issue(path, &err),
            }
        }
        Ok(entries)
    }

    /// Build a node from `lstat` metadata. Directories start at zero and
    /// grow as children are merged; symlinks are never followed.
    fn node_from_metadata(&self, name: CompactString, metadata: &Metadata) -> io::Result<FileNode> {
        let mut node = if metadata.is_dir() {
            FileNode::new_dir(name)
        } else {
            FileNode::new_file(
                name,
                self.probe.size(metadata)?,
                self.probe.size_on_disk(metadata)?,
            )
        };
        node.mode = file_mode(metadata);
        node.modified = metadata.modified().ok();
        Ok(node)
    }

    fn note_entry(&self, path: &Path, node: &FileNode) {
        if node.is_dir {
            self.dirs_found.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files_found.fetch_add(1, Ordering::Relaxed);
            self.bytes_found.fetch_add(node.size, Ordering::Relaxed);
        }

        let Some(tx) = self.progress else {
            return;
        };
        if self.entries_found() % UPDATE_INTERVAL == 0 {
            // Updates are best-effort: a full channel drops them.
            let _ = tx.try_send(ScanProgress::Update {
                files_found: self.files_found.load(Ordering::Relaxed),
                dirs_found: self.dirs_found.load(Ordering::Relaxed),
                total_size: self.bytes_found.load(Ordering::Relaxed),
                current_path: path.to_string_lossy().into_owned(),
            });
        }
    }

    fn record_issue(&self, path: &Path, err: &io::Error) {
        warn!("{}: {err}", path.display());
        let issue = ScanIssue {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        if let Some(tx) = self.progress {
            let _ = tx.try_send(ScanProgress::Error {
                path: issue.path.to_string_lossy().into_owned(),
                message: issue.message.clone(),
            });
        }
        self.issues.lock().push(issue);
    }
}

/// Derive a display name for the scan root.
fn root_display_name(path: &Path) -> CompactString {
    if let Some(name) = path.file_name() {
        return CompactString::new(name.to_string_lossy());
    }
    let s = path.to_string_lossy();
    let trimmed = s.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        CompactString::new(&s)
    } else {
        CompactString::new(trimmed)
    }
}
