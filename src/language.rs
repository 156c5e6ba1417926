use std::path::Path;

use serde::{Deserialize, Serialize};

/// A source language recognised by the registry.
///
/// Uses a plain enum (not trait objects). Cheap to copy and pattern-matched at
/// dispatch boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    /// TypeScript with JSX. Needs its own grammar: the plain TypeScript grammar cannot
    /// parse JSX and the TSX grammar breaks `<T>expr` assertions.
    Tsx,
    Unknown,
}

impl Language {
    /// All languages that have a grammar.
    pub const PARSED: [Language; 4] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Tsx,
    ];

    /// Map a bare extension (no leading dot) to a language.
    pub fn from_extension(ext: &str) -> Language {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "mts" | "cts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            _ => Language::Unknown,
        }
    }

    /// Returns true if this language owns the given extension.
    pub fn matches_extension(&self, ext: &str) -> bool {
        *self != Language::Unknown && Language::from_extension(ext) == *self
    }

    /// Human-readable display name for summaries.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::Unknown => "unknown",
        }
    }

    /// True for languages whose module references use dot notation (`pkg.mod`)
    /// rather than path notation (`./pkg/mod`).
    pub fn uses_dotted_modules(&self) -> bool {
        matches!(self, Language::Python)
    }

    /// Parse a CLI flag string into a `Language`. Case-insensitive.
    ///
    /// Accepted values:
    /// - "python" or "py"      -> Python
    /// - "javascript" or "js"  -> JavaScript
    /// - "typescript" or "ts"  -> TypeScript
    /// - "tsx"                 -> Tsx
    pub fn from_str_loose(s: &str) -> Option<Language> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "javascript" | "js" => Some(Language::JavaScript),
            "typescript" | "ts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            _ => None,
        }
    }
}

/// Detect a file's language from its extension. Pure; never touches the filesystem.
pub fn detect_language(path: impl AsRef<Path>) -> Language {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(Language::from_extension)
        .unwrap_or(Language::Unknown)
}
