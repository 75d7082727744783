/// A single node in the arena-allocated disk-usage tree.
///
/// Nodes are stored in a flat `Vec<FileNode>` owned by [`super::FileTree`].
/// Parent-child relationships use indices rather than pointers: the child list
/// is the owning direction, the `parent` index is only used to rebuild paths.
use compact_str::CompactString;
use std::ffi::{OsStr, OsString};
use std::time::SystemTime;

/// Lightweight index into the arena `Vec<FileNode>`.
///
/// Uses `u32` to keep nodes small; it supports up to ~4 billion nodes,
/// which is more than enough for any real filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A single file or directory in the tree.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File or directory name only (NOT the full path).
    /// Full paths are reconstructed on demand by walking up via `parent`.
    pub name: CompactString,

    /// The exact on-disk name when it is not valid UTF-8 and `name` is
    /// therefore a lossy rendering. Used to rebuild real paths.
    pub raw_name: Option<OsString>,

    /// Permission and file-type bits as reported by the platform.
    pub mode: u32,

    /// Logical size in bytes.
    /// For directories this is the sum over every descendant discovered by the
    /// walk, including children hidden by ignore rules or the size threshold.
    pub size: u64,

    /// Space allocated on disk (block- or cluster-rounded), aggregated like `size`.
    pub size_on_disk: u64,

    /// `true` if this node represents a directory.
    pub is_dir: bool,

    /// Last-modified timestamp, if the platform reports one.
    pub modified: Option<SystemTime>,

    /// Index of the parent node. `None` only for the root.
    /// Set once when the node is attached and never changed afterwards.
    pub parent: Option<NodeIndex>,

    /// Visible children in display order.
    pub children: Vec<NodeIndex>,
}

impl FileNode {
    /// Create a new file node with the given sizes.
    pub fn new_file(name: CompactString, size: u64, size_on_disk: u64) -> Self {
        Self {
            name,
            raw_name: None,
            mode: 0,
            size,
            size_on_disk,
            is_dir: false,
            modified: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a new, empty directory node. Sizes start at zero and grow as
    /// children are merged in.
    pub fn new_dir(name: CompactString) -> Self {
        Self {
            name,
            raw_name: None,
            mode: 0,
            size: 0,
            size_on_disk: 0,
            is_dir: true,
            modified: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Build a node name from an on-disk name, keeping the raw bytes when
    /// they do not survive UTF-8 conversion.
    pub fn split_os_name(os_name: OsString) -> (CompactString, Option<OsString>) {
        match os_name.into_string() {
            Ok(utf8) => (CompactString::from(utf8), None),
            Err(raw) => (CompactString::new(raw.to_string_lossy()), Some(raw)),
        }
    }

    /// The name to use when building a filesystem path.
    pub fn os_name(&self) -> &OsStr {
        match &self.raw_name {
            Some(raw) => raw.as_os_str(),
            None => OsStr::new(self.name.as_str()),
        }
    }

    /// Copy of this node's own attributes with no parent and no children.
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            raw_name: self.raw_name.clone(),
            mode: self.mode,
            size: self.size,
            size_on_disk: self.size_on_disk,
            is_dir: self.is_dir,
            modified: self.modified,
            parent: None,
            children: Vec::new(),
        }
    }
}
