pub mod envelope;
pub mod snapshot;

pub use envelope::{CACHE_DIR, CACHE_FILE, CACHE_VERSION, cache_path, load_snapshot, save_snapshot};
pub use snapshot::GraphSnapshot;
