//! JSON persistence for the agent.
//!
//! Two files are maintained, both written with full-file atomic replace:
//! `state.json` (the snapshot of preferences and the manual flag) and
//! `logs.json` (the activity log). Saves run on background threads so the
//! agent loop never blocks on disk; failures are logged and the in-memory
//! state stays authoritative until the next successful write.

pub mod log;
pub mod state;

pub use log::{ActivityLog, LogEntry};
pub use state::{Snapshot, StateStore};

use std::io;
use std::path::{Path, PathBuf};

/// Write `contents` to `path` with full-file replace semantics.
///
/// The data is staged in a sibling temp file and renamed into place, so a
/// crash mid-write can never leave a truncated file behind.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, contents)?;
    std::fs::rename(&staging, path)
}

/// Persist `contents` on a fire-and-forget background thread.
///
/// Last writer wins; there is no retry. A failed write is logged and the
/// next save attempt replaces it.
pub(crate) fn save_in_background(path: PathBuf, contents: String, what: &'static str) {
    std::thread::spawn(move || {
        if let Err(e) = write_atomic(&path, contents.as_bytes()) {
            tracing::warn!("failed to save {what} to {path:?}: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");

        write_atomic(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        // No staging file is left behind.
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");

        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
