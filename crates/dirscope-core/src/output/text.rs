/// Indented plain-text rendering of a tree.
use crate::model::{FileTree, NodeIndex, SizeFormat};
use std::io::{self, Write};

/// One line for a node: `name [size-on-disk]`, indented two spaces per level.
pub fn node_line(tree: &FileTree, index: NodeIndex, depth: usize, format: SizeFormat) -> String {
    let node = tree.node(index);
    format!(
        "{:indent$}{} [{}]",
        "",
        node.name,
        format.format(node.size_on_disk),
        indent = depth * 2
    )
}

/// Write every visible node in pre-order, one per line.
pub fn write_tree<W: Write>(tree: &FileTree, format: SizeFormat, out: &mut W) -> io::Result<()> {
    for (idx, depth) in tree.descendants(tree.root()) {
        writeln!(out, "{}", node_line(tree, idx, depth, format))?;
    }
    Ok(())
}

/// [`write_tree`] into a `String`.
pub fn render_tree(tree: &FileTree, format: SizeFormat) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_tree(tree, format, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
