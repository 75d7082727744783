/// Structural mutations that also touch the filesystem.
///
/// Both operations keep ancestor aggregates in step with the change, so the
/// walker's invariant (a directory's size is the sum of everything found below
/// it) still holds after the tree has been edited.
use super::file_node::{FileNode, NodeIndex};
use super::file_tree::FileTree;
use crate::error::TreeError;
use crate::platform::{file_mode, DiskUsageProbe};
use compact_str::CompactString;
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::info;

impl FileTree {
    /// Delete the file behind a leaf node and detach it from its parent.
    ///
    /// `base` is the path the tree was scanned from. Directories and the root
    /// are refused. The file is deleted first, so a failed delete leaves the
    /// tree untouched.
    pub fn remove_file(&mut self, index: NodeIndex, base: &Path) -> Result<(), TreeError> {
        let node = self.node(index);
        let Some(parent) = node.parent else {
            return Err(TreeError::RootRemoval);
        };
        if node.is_dir {
            return Err(TreeError::IsDirectory(node.name.to_string()));
        }
        let (size, size_on_disk) = (node.size, node.size_on_disk);

        let path = self.relative_path(index, base);
        fs::remove_file(&path).map_err(|source| TreeError::Io {
            path: path.clone(),
            source,
        })?;

        if self.remove_child(parent, index) {
            self.shrink_ancestors(index, size, size_on_disk);
        }
        info!("Removed {}", path.display());
        Ok(())
    }

    /// Create a new empty file named `name` inside the directory `index`.
    ///
    /// Fails if `index` is not a directory, if `name` is not a plain file
    /// name, or if something already exists at the target path.
    pub fn create_child(
        &mut self,
        index: NodeIndex,
        name: &str,
        base: &Path,
        probe: &dyn DiskUsageProbe,
    ) -> Result<NodeIndex, TreeError> {
        let parent = self.node(index);
        if !parent.is_dir {
            return Err(TreeError::NotDirectory(parent.name.to_string()));
        }
        if !is_plain_name(name) {
            return Err(TreeError::InvalidName(name.to_string()));
        }

        let path = self.relative_path(index, base).join(name);
        if fs::symlink_metadata(&path).is_ok() {
            return Err(TreeError::AlreadyExists(path));
        }

        let io_err = |source| TreeError::Io {
            path: path.clone(),
            source,
        };
        // `create_new` closes the gap between the existence check and creation.
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::AlreadyExists => TreeError::AlreadyExists(path.clone()),
                _ => io_err(source),
            })?;
        let metadata = file.metadata().map_err(io_err)?;
        let size = probe.size(&metadata).map_err(io_err)?;
        let size_on_disk = probe.size_on_disk(&metadata).map_err(io_err)?;

        let mut node = FileNode::new_file(CompactString::new(name), size, size_on_disk);
        node.mode = file_mode(&metadata);
        node.modified = metadata.modified().ok();

        let child = self.add_child(index, node);
        self.grow_ancestors(child, size, size_on_disk);
        info!("Created {}", path.display());
        Ok(child)
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
