//! Error types for the dependency-graph engine.
//!
//! Only query-level failures propagate to callers. Per-file read/parse problems are
//! recorded as [`FileError`] values on the built graph and never abort a build.

use std::fmt;

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced through the public contract.
#[derive(Debug, Error)]
pub enum Error {
    /// The queried path is not a node in the graph.
    #[error("file not found in dependency graph: {path}")]
    NotFound { path: String },

    /// Filesystem operation failed (snapshot store only).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Why a single file contributed no imports to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    /// The file could not be read from disk.
    Read,
    /// tree-sitter produced no tree for the file.
    Parse,
    /// No grammar is registered for the file's language.
    Unsupported,
}

impl fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileErrorKind::Read => "read",
            FileErrorKind::Parse => "parse",
            FileErrorKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// A non-fatal, per-file failure collected during a build.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileError {
    /// Repo-relative path of the file.
    pub path: String,
    pub kind: FileErrorKind,
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.kind)
    }
}

impl std::error::Error for FileError {}
