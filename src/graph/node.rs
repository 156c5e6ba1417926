use serde::{Deserialize, Serialize};

use crate::language::Language;

/// A discovered source file. Identity is its repo-relative POSIX path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Repo-relative path using `/` separators, e.g. `src/utils/index.ts`.
    pub path: String,
    pub language: Language,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
        }
    }

    /// Final path component, e.g. `index.ts`.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without its last extension, e.g. `utils.test` for `utils.test.ts`.
    pub fn stem(&self) -> &str {
        file_stem(&self.path)
    }
}

/// Stem of the last path component: everything before the final `.`, or the whole
/// name when it has no extension or starts with its only dot.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}
