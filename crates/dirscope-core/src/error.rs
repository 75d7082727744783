/// Error types for the dirscope core.
///
/// Per-entry I/O failures below the scan root are *not* errors here: they are
/// recorded as [`crate::scanner::ScanIssue`]s and the walk keeps going.
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a scan before a tree is produced.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan root itself could not be inspected.
    #[error("cannot inspect scan root {}: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ignore rules could not be loaded.
    #[error(transparent)]
    Config(#[from] IgnoreError),

    /// The scan thread or its worker pool could not be started.
    #[error("worker thread failure: {0}")]
    Thread(String),

    /// The scan was cancelled before it completed.
    #[error("scan cancelled")]
    Cancelled,
}

/// Failures while loading ignore-rule files.
#[derive(Error, Debug)]
pub enum IgnoreError {
    #[error("cannot read ignore file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern {pattern:?} at {}:{line}: {source}", path.display())]
    Pattern {
        path: PathBuf,
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Rejected structural mutations of a [`crate::model::FileTree`].
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("only the root node can be cloned")]
    NotRoot,

    #[error("the root node cannot be removed")]
    RootRemoval,

    #[error("cannot remove directory {0}")]
    IsDirectory(String),

    #[error("cannot create a file under a file ({0})")]
    NotDirectory(String),

    #[error("file with path {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("invalid file name {0:?}")]
    InvalidName(String),

    #[error("no node at {0} in the scanned tree")]
    NotFound(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The search query could not be compiled.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid search regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A human byte-size string (e.g. `10M`) could not be parsed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SizeParseError {
    #[error("empty size")]
    Empty,

    #[error("invalid number in size {0:?}")]
    InvalidNumber(String),

    #[error("invalid unit suffix {0:?}")]
    InvalidSuffix(String),

    #[error("size {0:?} overflows")]
    Overflow(String),
}

/// Failures while exporting a tree.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}
