/// dirscope core: scanning, filtering, and the disk-usage data model.
///
/// This crate contains all business logic with no UI dependencies, so the
/// same scanner and tree can back a CLI, a TUI, or a GUI.
///
/// # Modules
///
/// - [`model`]: Arena-allocated file tree, size formatting, on-disk mutations.
/// - [`scanner`]: Parallel recursive scanning with progress reporting.
/// - [`ignore`]: Name-based ignore rules loaded from rule files.
/// - [`search`]: Name search that prunes a tree to its matching files.
/// - [`output`]: Text, JSON and CSV rendering plus per-node details.
/// - [`session`]: Original/view tree pair with marks and mutations.
/// - [`platform`]: On-disk size probes and permission bits.
pub mod error;
pub mod ignore;
pub mod model;
pub mod output;
pub mod platform;
pub mod scanner;
pub mod search;
pub mod session;
