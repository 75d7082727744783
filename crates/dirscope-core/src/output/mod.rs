/// Rendering a tree for people and for other programs.
pub mod details;
pub mod export;
pub mod text;

pub use details::{mode_string, NodeDetails};
pub use export::{write_csv, write_json, ExportNode};
pub use text::{node_line, render_tree, write_tree};

use crate::model::{format_count, FileTree, SizeFormat};

/// Selectable output formats for a finished tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// `"<n> files, <total> on disk"` for the visible part of `tree`.
pub fn summary_line(tree: &FileTree, format: SizeFormat) -> String {
    let files = tree.file_count(tree.root());
    let noun = if files == 1 { "file" } else { "files" };
    format!(
        "{} {noun}, {} on disk",
        format_count(files),
        format.format(tree.total_size_on_disk())
    )
}
