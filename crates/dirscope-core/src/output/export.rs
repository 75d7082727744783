/// Machine-readable exports: nested JSON and flat CSV.
use crate::error::ExportError;
use crate::model::{FileTree, NodeIndex};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// JSON shape of one node and its visible children.
#[derive(Debug, Clone, Serialize)]
pub struct ExportNode<'a> {
    pub name: &'a str,
    pub is_dir: bool,
    pub size: u64,
    pub size_on_disk: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExportNode<'a>>,
}

impl<'a> ExportNode<'a> {
    pub fn build(tree: &'a FileTree, index: NodeIndex) -> Self {
        let node = tree.node(index);
        Self {
            name: node.name.as_str(),
            is_dir: node.is_dir,
            size: node.size,
            size_on_disk: node.size_on_disk,
            modified: node.modified.map(DateTime::<Utc>::from),
            children: tree
                .children(index)
                .iter()
                .map(|&c| Self::build(tree, c))
                .collect(),
        }
    }
}

/// Pretty-printed JSON for the whole tree.
pub fn write_json<W: Write>(tree: &FileTree, out: &mut W) -> Result<(), ExportError> {
    let root = ExportNode::build(tree, tree.root());
    serde_json::to_writer_pretty(&mut *out, &root)?;
    writeln!(out)?;
    Ok(())
}

/// One CSV row per visible node, pre-order, paths rooted at `base`.
pub fn write_csv<W: Write>(tree: &FileTree, base: &Path, out: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["path", "is_dir", "size", "size_on_disk", "modified"])?;
    for (idx, _) in tree.descendants(tree.root()) {
        let node = tree.node(idx);
        let modified = node
            .modified
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
            .unwrap_or_default();
        wtr.write_record([
            tree.relative_path(idx, base).to_string_lossy().as_ref(),
            if node.is_dir { "true" } else { "false" },
            &node.size.to_string(),
            &node.size_on_disk.to_string(),
            &modified,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileNode;
    use compact_str::CompactString;

    fn sample() -> FileTree {
        let mut tree = FileTree::new(FileNode::new_dir(CompactString::new("root")));
        let root = tree.root();
        let f = tree.add_child(root, FileNode::new_file(CompactString::new("a,b.txt"), 5, 4096));
        tree.grow_ancestors(f, 5, 4096);
        tree
    }

    #[test]
    fn test_json_is_nested() {
        let mut buf = Vec::new();
        write_json(&sample(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["name"], "root");
        assert_eq!(value["size_on_disk"], 4096);
        assert_eq!(value["children"][0]["name"], "a,b.txt");
        assert_eq!(value["children"][0]["is_dir"], false);
        assert!(value["children"][0].get("children").is_none());
    }

    #[test]
    fn test_csv_rows_quote_and_root_paths() {
        let mut buf = Vec::new();
        write_csv(&sample(), Path::new("/data"), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "path,is_dir,size,size_on_disk,modified");
        assert_eq!(lines[1], "/data,true,5,4096,");
        assert_eq!(lines[2], "\"/data/a,b.txt\",false,5,4096,");
    }
}
