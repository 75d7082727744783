/// Data model for the dirscope disk-usage tree.
///
/// Re-exports the arena-allocated tree structure and supporting types.
pub mod file_node;
pub mod file_tree;
mod mutate;
pub mod size;

pub use file_node::{FileNode, NodeIndex};
pub use file_tree::{Descendants, FileTree};
pub use size::{format_count, format_size, parse_byte_size, SizeFormat};
