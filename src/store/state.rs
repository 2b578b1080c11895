//! Snapshot persistence: the sole application state restored at startup.

use crate::config::Preferences;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The persisted pair of preferences and manual intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub preferences: Preferences,
    pub manual_simulate_activity: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            preferences: Preferences::default(),
            manual_simulate_activity: false,
        }
    }
}

/// Durable store for the [`Snapshot`].
///
/// Load failures (missing file, corrupt JSON) are never surfaced to the
/// user; the caller falls back to defaults.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, applying the interval migration.
    ///
    /// Returns `None` if the file is absent or unreadable.
    pub fn load(&self) -> Option<Snapshot> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("failed to read state from {:?}: {e}", self.path);
                }
                return None;
            }
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(mut snapshot) => {
                snapshot.preferences.migrate();
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!("failed to decode state from {:?}: {e}", self.path);
                None
            }
        }
    }

    /// Persist the snapshot on a background thread.
    pub fn save(&self, snapshot: &Snapshot) {
        match serde_json::to_string_pretty(snapshot) {
            Ok(json) => super::save_in_background(self.path.clone(), json, "state"),
            Err(e) => tracing::warn!("failed to encode state: {e}"),
        }
    }

    /// Persist the snapshot before returning. Used by one-shot CLI commands
    /// that exit immediately after writing.
    pub fn save_blocking(&self, snapshot: &Snapshot) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(snapshot).map_err(std::io::Error::other)?;
        super::write_atomic(&self.path, json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> StateStore {
        StateStore::new(dir.path().join("state.json"))
    }

    #[test]
    fn test_load_absent_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let snapshot = Snapshot {
            preferences: Preferences {
                jiggle_distance: 75.0,
                log_retention_days: 14,
                ..Preferences::default()
            },
            manual_simulate_activity: true,
        };
        store.save_blocking(&snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_load_corrupt_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_applies_interval_migration() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut snapshot = Snapshot::default();
        snapshot.preferences.jiggle_interval = 60.0;
        store.save_blocking(&snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.preferences.jiggle_interval, 5.0);

        // Non-legacy values survive the round trip untouched.
        snapshot.preferences.jiggle_interval = 12.0;
        store.save_blocking(&snapshot).unwrap();
        assert_eq!(store.load().unwrap().preferences.jiggle_interval, 12.0);
    }

    #[test]
    fn test_camel_case_field_names_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_blocking(&Snapshot::default()).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("manualSimulateActivity"));
        assert!(raw.contains("launchAtLogin"));
        assert!(raw.contains("jiggleInterval"));
    }
}
