/// Application state for a presentation layer.
///
/// A session owns the scanned tree (`original`) and the tree currently shown
/// (`view`), which is either a plain copy of the original or the result of a
/// search. Node indices handed to the session always refer to the **view**.
///
/// Mutations touch the disk and the original tree, then re-derive the view
/// from the active query. Each view node remembers which original node it
/// was copied from, so a mutation always hits the selected entry even when
/// siblings share a display name. Marks are indices into the view, so every
/// change of view clears them.
use crate::error::{SearchError, TreeError};
use crate::model::{FileNode, FileTree, NodeIndex, SizeFormat};
use crate::output::{summary_line, NodeDetails};
use crate::platform::{default_probe, DiskUsageProbe};
use crate::search::{filter_tree_mapped, SearchQuery};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Session {
    // ── Trees ──────────────────────────────────────────
    original: FileTree,
    view: FileTree,
    /// `origin[i]` is the original node that view node `i` was copied from.
    origin: Vec<NodeIndex>,
    /// Path the original tree was scanned from.
    base: PathBuf,

    // ── View state ─────────────────────────────────────
    pub format: SizeFormat,
    query: Option<SearchQuery>,
    marked: BTreeSet<NodeIndex>,

    probe: &'static dyn DiskUsageProbe,
}

impl Session {
    pub fn new(tree: FileTree, base: impl Into<PathBuf>) -> Self {
        Self::with_probe(tree, base, default_probe())
    }

    /// Session whose created files are sized with `probe`.
    pub fn with_probe(
        tree: FileTree,
        base: impl Into<PathBuf>,
        probe: &'static dyn DiskUsageProbe,
    ) -> Self {
        let (view, origin) = tree.extract_mapped(|_, _| true);
        Self {
            original: tree,
            view,
            origin,
            base: base.into(),
            format: SizeFormat::default(),
            query: None,
            marked: BTreeSet::new(),
            probe,
        }
    }

    pub fn original(&self) -> &FileTree {
        &self.original
    }

    pub fn view(&self) -> &FileTree {
        &self.view
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The query behind the current view, if it is filtered.
    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    // ── Filtering ──────────────────────────────────────

    /// Replace the view with the original filtered by `query`.
    /// A no-op query behaves like [`Session::restore_original`].
    pub fn apply_filter(&mut self, query: SearchQuery) {
        self.query = (!query.is_noop()).then_some(query);
        self.refresh_view();
    }

    /// Build a query from raw inputs and apply it.
    pub fn search(
        &mut self,
        contains: Option<&str>,
        regex: Option<&str>,
        case_insensitive: bool,
        invert: bool,
    ) -> Result<(), SearchError> {
        let query = SearchQuery::new(contains, regex, case_insensitive, invert)?;
        self.apply_filter(query);
        Ok(())
    }

    /// Show the full original tree again.
    pub fn restore_original(&mut self) {
        self.query = None;
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        (self.view, self.origin) = match &self.query {
            Some(query) => filter_tree_mapped(&self.original, query),
            None => self.original.extract_mapped(|_, _| true),
        };
        self.marked.clear();
        debug!(
            "View rebuilt: {} of {} nodes",
            self.view.len(),
            self.original.len()
        );
    }

    // ── Marks ──────────────────────────────────────────

    /// Flip the mark on `index`; returns whether it is now marked.
    /// Indices outside the current view are ignored.
    pub fn toggle_mark(&mut self, index: NodeIndex) -> bool {
        if index.idx() >= self.view.len() {
            return false;
        }
        if self.marked.remove(&index) {
            false
        } else {
            self.marked.insert(index);
            true
        }
    }

    pub fn is_marked(&self, index: NodeIndex) -> bool {
        self.marked.contains(&index)
    }

    pub fn unmark_all(&mut self) {
        self.marked.clear();
    }

    /// Full paths of every marked node, in arena order.
    pub fn marked_paths(&self) -> Vec<PathBuf> {
        self.marked
            .iter()
            .map(|&idx| self.view.relative_path(idx, &self.base))
            .collect()
    }

    // ── Mutations ──────────────────────────────────────

    /// Create an empty file `name` in the directory `index`, or in the
    /// parent directory when `index` is a file. Returns the new file's path.
    pub fn create_file(&mut self, index: NodeIndex, name: &str) -> Result<PathBuf, TreeError> {
        let node = self.view_node(index)?;
        let dir = match (node.is_dir, node.parent) {
            (true, _) => index,
            (false, Some(parent)) => parent,
            (false, None) => return Err(TreeError::NotDirectory(node.name.to_string())),
        };

        let target = self.locate(dir)?;
        let created = self
            .original
            .create_child(target, name, &self.base, self.probe)?;
        let path = self.original.relative_path(created, &self.base);
        self.refresh_view();
        Ok(path)
    }

    /// Delete the file behind `index`. The root and directories are refused.
    pub fn remove_file(&mut self, index: NodeIndex) -> Result<PathBuf, TreeError> {
        let node = self.view_node(index)?;
        if node.parent.is_none() {
            return Err(TreeError::RootRemoval);
        }
        if node.is_dir {
            return Err(TreeError::IsDirectory(node.name.to_string()));
        }

        let target = self.locate(index)?;
        let path = self.original.relative_path(target, &self.base);
        self.original.remove_file(target, &self.base)?;
        self.refresh_view();
        Ok(path)
    }

    fn view_node(&self, index: NodeIndex) -> Result<&FileNode, TreeError> {
        self.view
            .nodes
            .get(index.idx())
            .ok_or_else(|| TreeError::NotFound(format!("view node #{}", index.0)))
    }

    /// Map a view index to the node it was copied from in the original tree.
    fn locate(&self, index: NodeIndex) -> Result<NodeIndex, TreeError> {
        self.origin
            .get(index.idx())
            .copied()
            .ok_or_else(|| TreeError::NotFound(format!("view node #{}", index.0)))
    }

    // ── Display ────────────────────────────────────────

    pub fn details(&self, index: NodeIndex) -> NodeDetails {
        NodeDetails::new(&self.view, index, &self.base, self.format)
    }

    pub fn summary(&self) -> String {
        summary_line(&self.view, self.format)
    }
}
