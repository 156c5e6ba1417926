use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::DepGraphConfig;
use crate::graph::builder::relative_posix;
use crate::language::{Language, detect_language};

/// Walk a repository and collect source files the engine can parse.
///
/// Respects `.gitignore` rules (even outside a git repository), never descends into the
/// configured skip directories, and applies the `exclude` globs from config.
///
/// When `allowed_languages` is `Some(set)`, only files of those languages are returned.
/// Paths are repo-relative with `/` separators, sorted.
pub fn discover_files(
    root: &Path,
    config: &DepGraphConfig,
    allowed_languages: Option<&HashSet<Language>>,
) -> Vec<String> {
    let skip_dirs: HashSet<String> = config.skip_dirs().into_iter().map(str::to_owned).collect();
    let excludes = compile_excludes(config.exclude_patterns());

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        .require_git(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            !(is_dir
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| skip_dirs.contains(name)))
        })
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry during discovery");
                continue;
            }
        };

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let Some(rel) = relative_posix(root, entry.path()) else {
            continue;
        };

        if is_excluded(&rel, &excludes) {
            debug!(path = %rel, "excluded by config");
            continue;
        }

        if detect_language(&rel) == Language::Unknown {
            continue;
        }

        // Apply language filter if specified.
        let ext = entry.path().extension().and_then(|e| e.to_str()).unwrap_or("");
        if let Some(langs) = allowed_languages
            && !langs.iter().any(|lang| lang.matches_extension(ext))
        {
            continue;
        }

        files.push(rel);
    }

    files.sort();
    debug!(count = files.len(), root = %root.display(), "discovered source files");
    files
}

fn compile_excludes(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!(pattern = %p, error = %err, "ignoring invalid exclude pattern");
                None
            }
        })
        .collect()
}

/// A pattern excludes a file if it matches the whole relative path or any single component.
fn is_excluded(rel: &str, patterns: &[glob::Pattern]) -> bool {
    patterns
        .iter()
        .any(|p| p.matches(rel) || rel.split('/').any(|component| p.matches(component)))
}
