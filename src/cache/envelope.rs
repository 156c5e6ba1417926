use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

use super::snapshot::GraphSnapshot;

/// Current snapshot format version. Bump when `GraphSnapshot` or `RawImport` layout changes;
/// bincode has no field names to fall back on.
pub const CACHE_VERSION: u32 = 1;

/// Cache directory name (created in the repository root).
pub const CACHE_DIR: &str = ".depgraph";
/// Cache file name within CACHE_DIR.
pub const CACHE_FILE: &str = "graph.bin";

/// Build the cache file path for a repository: `<repo_root>/.depgraph/graph.bin`
pub fn cache_path(repo_root: &Path) -> PathBuf {
    repo_root.join(CACHE_DIR).join(CACHE_FILE)
}

/// Save the snapshot to disk atomically using bincode serialization.
///
/// Writes to a temp file first, then renames to the final path.
/// Creates the `.depgraph/` directory if it doesn't exist.
pub fn save_snapshot(repo_root: &Path, snapshot: &GraphSnapshot) -> Result<()> {
    let cache_dir = repo_root.join(CACHE_DIR);
    std::fs::create_dir_all(&cache_dir)?;

    let target = cache_path(repo_root);
    let mut tmp = tempfile::NamedTempFile::new_in(&cache_dir)?;
    bincode::serde::encode_into_std_write(snapshot, &mut tmp, bincode::config::standard())
        .map_err(|e| Error::Snapshot(e.to_string()))?;
    tmp.as_file().flush()?;
    tmp.persist(&target).map_err(|e| Error::Io(e.error))?;

    debug!(path = %target.display(), files = snapshot.files.len(), "snapshot saved");
    Ok(())
}

/// Load the cached snapshot from disk. Returns None if:
/// - Cache file doesn't exist
/// - Cache version doesn't match CACHE_VERSION
/// - Deserialization fails (corrupt cache)
pub fn load_snapshot(repo_root: &Path) -> Option<GraphSnapshot> {
    let target = cache_path(repo_root);
    let bytes = std::fs::read(&target).ok()?;
    let result =
        bincode::serde::decode_from_slice::<GraphSnapshot, _>(&bytes, bincode::config::standard());
    match result {
        Ok((snapshot, _)) if snapshot.version == CACHE_VERSION => Some(snapshot),
        Ok((snapshot, _)) => {
            debug!(found = snapshot.version, expected = CACHE_VERSION, "stale snapshot version");
            None
        }
        Err(err) => {
            debug!(error = %err, "corrupt snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::parser::imports::{ImportKind, RawImport};

    fn snapshot() -> GraphSnapshot {
        let entries = vec![
            (
                "main.py".to_string(),
                vec![RawImport::new("pkg.mod", ImportKind::FromImport)],
            ),
            ("pkg/mod.py".to_string(), vec![]),
        ];
        GraphBuilder::default().assemble(entries, Vec::new()).to_snapshot()
    }

    #[test]
    fn test_roundtrip_cache() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let snap = snapshot();

        save_snapshot(tmp_dir.path(), &snap).unwrap();
        assert!(cache_path(tmp_dir.path()).exists());

        let loaded = load_snapshot(tmp_dir.path()).expect("cache should load");
        assert_eq!(loaded, snap);
        assert_eq!(loaded.edges.len(), 1);
    }

    #[test]
    fn test_load_missing_cache_returns_none() {
        let tmp_dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot(tmp_dir.path()).is_none());
    }

    #[test]
    fn test_version_mismatch_returns_none() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let mut snap = snapshot();
        snap.version = CACHE_VERSION + 1;
        save_snapshot(tmp_dir.path(), &snap).unwrap();
        assert!(load_snapshot(tmp_dir.path()).is_none());
    }

    #[test]
    fn test_corrupt_cache_returns_none() {
        let tmp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp_dir.path().join(CACHE_DIR)).unwrap();
        std::fs::write(cache_path(tmp_dir.path()), b"\xff\xff not bincode").unwrap();
        assert!(load_snapshot(tmp_dir.path()).is_none());
    }
}
