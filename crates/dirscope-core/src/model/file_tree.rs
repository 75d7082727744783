/// Arena-backed disk-usage tree.
///
/// All nodes live in a single `Vec<FileNode>`. Relationships between nodes
/// use `NodeIndex` (a thin `u32` wrapper) rather than heap pointers, so node
/// identity is simply the index: two structurally identical nodes are still
/// distinct entries, and per-node side tables can be plain vectors.
///
/// A node detached with [`FileTree::remove_child`] keeps its arena slot but is
/// no longer reachable from the root. Traversals always start at the root, and
/// [`FileTree::duplicate`] produces a compact copy without such slots.
use super::file_node::{FileNode, NodeIndex};
use crate::error::TreeError;
use std::path::{Path, PathBuf};

/// The complete tree produced by a scan, a clone, or a filter.
#[derive(Debug, Clone)]
pub struct FileTree {
    /// Arena: every node in a flat, cache-friendly vector.
    pub nodes: Vec<FileNode>,

    root: NodeIndex,
}

impl FileTree {
    /// Create a tree holding only `root`.
    pub fn new(root: FileNode) -> Self {
        Self::with_capacity(root, 1)
    }

    /// Create a tree holding only `root`, with room for `estimated_nodes`.
    pub fn with_capacity(mut root: FileNode, estimated_nodes: usize) -> Self {
        root.parent = None;
        root.children.clear();
        let mut nodes = Vec::with_capacity(estimated_nodes.max(1));
        nodes.push(root);
        Self {
            nodes,
            root: NodeIndex(0),
        }
    }

    /// Index of the root node.
    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Get the node at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &FileNode {
        &self.nodes[index.idx()]
    }

    /// Visible children of a node, in display order.
    #[inline]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.nodes[index.idx()].children
    }

    /// Number of arena slots, including detached ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Aggregate logical size of the whole tree.
    pub fn total_size(&self) -> u64 {
        self.node(self.root).size
    }

    /// Aggregate size-on-disk of the whole tree.
    pub fn total_size_on_disk(&self) -> u64 {
        self.node(self.root).size_on_disk
    }

    /// Allocate `node` in the arena and append it to `parent`'s child list.
    ///
    /// This is the only place a parent reference is set. Sizes are not
    /// propagated; use [`FileTree::increment_size`] for that.
    pub fn add_child(&mut self, parent: NodeIndex, mut node: FileNode) -> NodeIndex {
        node.parent = Some(parent);
        let idx = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.idx()].children.push(idx);
        idx
    }

    /// Accumulate sizes on a single node.
    ///
    /// Takes `&mut self`, so concurrent callers must hold the tree behind a
    /// lock; the scanner never needs to because it merges task-local results.
    pub fn increment_size(&mut self, index: NodeIndex, size: u64, size_on_disk: u64) {
        let node = &mut self.nodes[index.idx()];
        node.size += size;
        node.size_on_disk += size_on_disk;
    }

    /// Detach `child` from `parent`'s child list by identity.
    ///
    /// Returns `false` if `child` was not a visible child of `parent`.
    pub fn remove_child(&mut self, parent: NodeIndex, child: NodeIndex) -> bool {
        let children = &mut self.nodes[parent.idx()].children;
        match children.iter().position(|&c| c == child) {
            Some(pos) => {
                children.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Add `size` / `size_on_disk` to every ancestor of `index`.
    pub(crate) fn grow_ancestors(&mut self, index: NodeIndex, size: u64, size_on_disk: u64) {
        let mut current = self.node(index).parent;
        while let Some(idx) = current {
            self.increment_size(idx, size, size_on_disk);
            current = self.node(idx).parent;
        }
    }

    /// Subtract `size` / `size_on_disk` from every ancestor of `index`.
    pub(crate) fn shrink_ancestors(&mut self, index: NodeIndex, size: u64, size_on_disk: u64) {
        let mut current = self.node(index).parent;
        while let Some(idx) = current {
            let node = &mut self.nodes[idx.idx()];
            node.size = node.size.saturating_sub(size);
            node.size_on_disk = node.size_on_disk.saturating_sub(size_on_disk);
            current = node.parent;
        }
    }

    /// Pre-order iterator over `start` and every node reachable below it,
    /// yielding `(index, depth)` with `start` at depth 0.
    pub fn descendants(&self, start: NodeIndex) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![(start, 0)],
        }
    }

    /// Recursively reorder every directory's children by descending
    /// size-on-disk. The sort is stable, so ties keep their prior order.
    pub fn sort_children_by_size_on_disk(&mut self) {
        let dirs: Vec<NodeIndex> = self
            .descendants(self.root)
            .map(|(idx, _)| idx)
            .filter(|&idx| self.node(idx).is_dir)
            .collect();

        for dir in dirs {
            let mut children = std::mem::take(&mut self.nodes[dir.idx()].children);
            children.sort_by(|a, b| {
                self.nodes[b.idx()]
                    .size_on_disk
                    .cmp(&self.nodes[a.idx()].size_on_disk)
            });
            self.nodes[dir.idx()].children = children;
        }
    }

    /// Reconstruct the full path for a node by walking up to the root.
    ///
    /// The root maps to `base`; an empty `base` falls back to the root's name.
    ///
    /// Components use each node's exact on-disk name, so paths stay valid for
    /// names that are not UTF-8.
    pub fn relative_path(&self, index: NodeIndex, base: &Path) -> PathBuf {
        let mut names = Vec::new();
        let mut current = index;
        while let Some(parent) = self.node(current).parent {
            names.push(self.node(current).os_name());
            current = parent;
        }
        let mut path = if base.as_os_str().is_empty() {
            PathBuf::from(self.node(self.root).os_name())
        } else {
            base.to_path_buf()
        };
        path.extend(names.into_iter().rev());
        path
    }

    /// Names from just below the root down to `index` (empty for the root).
    pub fn name_chain(&self, index: NodeIndex) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = index;
        while let Some(parent) = self.node(current).parent {
            names.push(self.node(current).name.as_str());
            current = parent;
        }
        names.reverse();
        names
    }

    /// Follow a name chain from the root through visible children.
    pub fn find(&self, names: &[&str]) -> Option<NodeIndex> {
        names.iter().try_fold(self.root, |current, name| {
            self.children(current)
                .iter()
                .copied()
                .find(|&c| self.node(c).name.as_str() == *name)
        })
    }

    /// Number of files at or below `index`. A file counts itself; a directory
    /// contributes only the counts of its visible children.
    pub fn file_count(&self, index: NodeIndex) -> u64 {
        self.descendants(index)
            .filter(|&(idx, _)| !self.node(idx).is_dir)
            .count() as u64
    }

    /// Deep-copy the tree starting from `index`, which must be the root.
    ///
    /// With `discard_files`, only the directory skeleton is kept. Sizes are
    /// copied as-is, so directories keep their aggregate totals.
    pub fn duplicate(&self, index: NodeIndex, discard_files: bool) -> Result<FileTree, TreeError> {
        if index != self.root {
            return Err(TreeError::NotRoot);
        }
        Ok(self.extract(|_, node| !discard_files || node.is_dir))
    }

    /// Compact copy of the tree keeping only the nodes accepted by `keep`
    /// (and only where every ancestor was kept). The root is always kept.
    pub(crate) fn extract<F>(&self, keep: F) -> FileTree
    where
        F: FnMut(NodeIndex, &FileNode) -> bool,
    {
        self.extract_mapped(keep).0
    }

    /// [`FileTree::extract`] that also returns, for every node of the copy,
    /// the index of the node it was copied from.
    pub(crate) fn extract_mapped<F>(&self, mut keep: F) -> (FileTree, Vec<NodeIndex>)
    where
        F: FnMut(NodeIndex, &FileNode) -> bool,
    {
        let mut out = FileTree::with_capacity(self.node(self.root).detached_copy(), self.len());
        let out_root = out.root();
        let mut origin = Vec::with_capacity(self.len());
        origin.push(self.root);

        // Children are pushed in reverse so they pop, and are appended, in order.
        let mut stack: Vec<(NodeIndex, NodeIndex)> = self
            .children(self.root)
            .iter()
            .rev()
            .map(|&c| (c, out_root))
            .collect();

        while let Some((src, dst_parent)) = stack.pop() {
            let node = self.node(src);
            if !keep(src, node) {
                continue;
            }
            let dst = out.add_child(dst_parent, node.detached_copy());
            origin.push(src);
            stack.extend(node.children.iter().rev().map(|&c| (c, dst)));
        }

        (out, origin)
    }
}

/// Iterator returned by [`FileTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a FileTree,
    stack: Vec<(NodeIndex, usize)>,
}

impl Iterator for Descendants<'_> {
    type Item = (NodeIndex, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, depth) = self.stack.pop()?;
        self.stack.extend(
            self.tree
                .children(idx)
                .iter()
                .rev()
                .map(|&c| (c, depth + 1)),
        );
        Some((idx, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    fn file(name: &str, size: u64, on_disk: u64) -> FileNode {
        FileNode::new_file(CompactString::new(name), size, on_disk)
    }

    fn dir(name: &str) -> FileNode {
        FileNode::new_dir(CompactString::new(name))
    }

    /// Build: root -> Users -> (a.txt: 100, b.txt: 200), root -> c.bin: 50
    fn sample() -> (FileTree, NodeIndex, NodeIndex, NodeIndex, NodeIndex) {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let users = tree.add_child(root, dir("Users"));
        let a = tree.add_child(users, file("a.txt", 100, 4096));
        tree.grow_ancestors(a, 100, 4096);
        let b = tree.add_child(users, file("b.txt", 200, 4096));
        tree.grow_ancestors(b, 200, 4096);
        let c = tree.add_child(root, file("c.bin", 50, 512));
        tree.grow_ancestors(c, 50, 512);
        (tree, users, a, b, c)
    }

    #[test]
    fn test_ancestor_aggregation() {
        let (tree, users, ..) = sample();
        assert_eq!(tree.node(users).size, 300);
        assert_eq!(tree.node(users).size_on_disk, 8192);
        assert_eq!(tree.total_size(), 350);
        assert_eq!(tree.total_size_on_disk(), 8704);
    }

    #[test]
    fn test_relative_path() {
        let (tree, users, a, ..) = sample();
        assert_eq!(
            tree.relative_path(a, Path::new("/data")),
            PathBuf::from("/data/Users/a.txt")
        );
        assert_eq!(tree.relative_path(users, Path::new("")), PathBuf::from("root/Users"));
        assert_eq!(tree.relative_path(tree.root(), Path::new("/data")), PathBuf::from("/data"));
    }

    #[test]
    fn test_file_count() {
        let (tree, users, a, ..) = sample();
        assert_eq!(tree.file_count(tree.root()), 3);
        assert_eq!(tree.file_count(users), 2);
        assert_eq!(tree.file_count(a), 1);
    }

    #[test]
    fn test_sort_by_size_on_disk_is_stable_and_descending() {
        let (mut tree, users, a, b, c) = sample();
        tree.sort_children_by_size_on_disk();
        assert_eq!(tree.children(tree.root()), &[users, c]);
        // Equal size-on-disk: prior (lexical) order is preserved.
        assert_eq!(tree.children(users), &[a, b]);
    }

    #[test]
    fn test_remove_child_uses_identity() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let first = tree.add_child(root, file("same", 1, 1));
        let second = tree.add_child(root, file("same", 1, 1));

        assert!(tree.remove_child(root, second));
        assert_eq!(tree.children(root), &[first]);
        assert!(!tree.remove_child(root, second));
    }

    #[test]
    fn test_duplicate_discards_files() {
        let (tree, ..) = sample();
        let skeleton = tree.duplicate(tree.root(), true).unwrap();
        let names: Vec<&str> = skeleton
            .descendants(skeleton.root())
            .map(|(idx, _)| skeleton.node(idx).name.as_str())
            .collect();
        assert_eq!(names, vec!["root", "Users"]);
        // Aggregates survive the copy.
        assert_eq!(skeleton.total_size(), 350);
    }

    #[test]
    fn test_duplicate_rejects_non_root() {
        let (tree, users, ..) = sample();
        assert!(matches!(tree.duplicate(users, false), Err(TreeError::NotRoot)));
    }

    #[test]
    fn test_duplicate_compacts_detached_nodes() {
        let (mut tree, users, a, ..) = sample();
        tree.remove_child(users, a);
        let copy = tree.duplicate(tree.root(), false).unwrap();
        assert_eq!(copy.len(), 4);
        assert_eq!(copy.find(&["Users", "a.txt"]), None);
        assert!(copy.find(&["Users", "b.txt"]).is_some());
    }

    #[test]
    fn test_name_chain_and_find_round_trip() {
        let (tree, _, _, b, _) = sample();
        let chain = tree.name_chain(b);
        assert_eq!(chain, vec!["Users", "b.txt"]);
        assert_eq!(tree.find(&chain), Some(b));
        assert_eq!(tree.find(&[]), Some(tree.root()));
    }

    #[test]
    fn test_extract_mapped_points_back_to_source() {
        let (mut tree, users, a, b, c) = sample();
        tree.remove_child(users, a);
        let (copy, origin) = tree.extract_mapped(|_, _| true);
        assert_eq!(origin.len(), copy.len());
        assert_eq!(origin[copy.root().idx()], tree.root());
        let copied_b = copy.find(&["Users", "b.txt"]).unwrap();
        assert_eq!(origin[copied_b.idx()], b);
        let copied_c = copy.find(&["c.bin"]).unwrap();
        assert_eq!(origin[copied_c.idx()], c);
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_path_keeps_raw_names() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"a\xff".to_vec());
        let (name, raw_name) = FileNode::split_os_name(raw.clone());
        assert_eq!(name.as_str(), "a\u{FFFD}");

        let mut node = file(name.as_str(), 1, 1);
        node.raw_name = raw_name;
        let mut tree = FileTree::new(dir("root"));
        let idx = tree.add_child(tree.root(), node);

        assert_eq!(tree.relative_path(idx, Path::new("/data")), Path::new("/data").join(&raw));
    }

    #[test]
    fn test_descendants_depths() {
        let (tree, ..) = sample();
        let depths: Vec<usize> = tree.descendants(tree.root()).map(|(_, d)| d).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 1]);
    }
}
