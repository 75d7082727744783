/// Per-node detail sheet, as shown when a single entry is selected.
use crate::model::{FileTree, NodeIndex, SizeFormat};
use crate::platform::permissions::{MODE_DIR, MODE_SYMLINK, MODE_TYPE_MASK};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything known about one node, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetails {
    pub path: PathBuf,
    /// `"<size> real, <size> on disk (<raw bytes>)"`.
    pub size: String,
    pub permissions: String,
    pub modified: String,
}

impl NodeDetails {
    pub fn new(tree: &FileTree, index: NodeIndex, base: &Path, format: SizeFormat) -> Self {
        let node = tree.node(index);
        let size = format!(
            "{} real, {} on disk ({})",
            format.format(node.size),
            format.format(node.size_on_disk),
            node.size_on_disk
        );
        let modified = node
            .modified
            .map(|t| {
                DateTime::<Local>::from(t)
                    .format("%Y-%m-%d %H:%M:%S %z")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string());
        Self {
            path: tree.relative_path(index, base),
            size,
            permissions: mode_string(node.mode, node.is_dir),
            modified,
        }
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> [(&'static str, String); 4] {
        [
            ("Path", self.path.display().to_string()),
            ("Size", self.size.clone()),
            ("Permissions", self.permissions.clone()),
            ("Modified", self.modified.clone()),
        ]
    }
}

impl fmt::Display for NodeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.rows() {
            writeln!(f, "{label:<12} {value}")?;
        }
        Ok(())
    }
}

/// `ls -l` style rendering of mode bits, e.g. `drwxr-xr-x`.
pub fn mode_string(mode: u32, is_dir: bool) -> String {
    let kind = match mode & MODE_TYPE_MASK {
        MODE_DIR => 'd',
        MODE_SYMLINK => 'l',
        _ if is_dir => 'd',
        _ => '-',
    };
    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}
