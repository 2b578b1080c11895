//! Append-only activity log with age-based pruning and flat-text export.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Log files beyond this size are treated as corrupt and discarded on load.
const MAX_LOG_FILE_BYTES: u64 = 10_000_000;

/// Legacy per-move entries written by early releases; dropped on load.
const LEGACY_SPAM_REASON: &str = "Mouse Jiggle";

/// A single state-transition record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub action: String,
    pub reason: String,
}

impl LogEntry {
    pub fn new(action: &str, reason: &str) -> Self {
        Self::at(Utc::now(), action, reason)
    }

    pub fn at(date: DateTime<Utc>, action: &str, reason: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Ordered record of state transitions, newest-first by insertion.
///
/// Every mutation triggers a background save. Save failures are logged and
/// non-fatal; the in-memory list stays authoritative.
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    path: PathBuf,
}

impl ActivityLog {
    /// Open the log at `path`, loading any persisted entries.
    ///
    /// A missing, corrupt, or oversized file yields an empty log rather
    /// than an error.
    pub fn open(path: PathBuf) -> Self {
        let entries = load_entries(&path);
        Self { entries, path }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert at the head and persist.
    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.save();
    }

    /// Remove all entries and persist.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    /// Remove entries strictly older than `days` days and persist.
    /// A retention of 0 means never prune.
    pub fn prune(&mut self, days: u32) {
        if days == 0 {
            return;
        }
        let cutoff = Utc::now() - Duration::days(days as i64);
        self.entries.retain(|entry| entry.date >= cutoff);
        self.save();
    }

    /// Render the log as one line per entry, newest first:
    /// `[<ISO8601 timestamp>] <action> - <reason>`.
    pub fn export_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "[{}] {} - {}",
                    entry.date.to_rfc3339_opts(SecondsFormat::Secs, true),
                    entry.action,
                    entry.reason
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn save(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(json) => super::save_in_background(self.path.clone(), json, "logs"),
            Err(e) => tracing::warn!("failed to encode logs: {e}"),
        }
    }

    /// Persist before returning. Used by one-shot CLI commands.
    pub fn save_blocking(&self) -> std::io::Result<()> {
        let json = serde_json::to_string(&self.entries).map_err(std::io::Error::other)?;
        super::write_atomic(&self.path, json.as_bytes())
    }
}

fn load_entries(path: &Path) -> VecDeque<LogEntry> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return VecDeque::new(),
    };

    // A runaway log from an earlier release can reach tens of megabytes;
    // decoding it would stall startup, so discard it instead.
    if metadata.len() > MAX_LOG_FILE_BYTES {
        tracing::warn!("log file is too large ({} bytes), clearing it", metadata.len());
        let _ = std::fs::remove_file(path);
        return VecDeque::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("failed to read logs from {path:?}: {e}");
            return VecDeque::new();
        }
    };

    match serde_json::from_str::<VecDeque<LogEntry>>(&content) {
        Ok(mut entries) => {
            entries.retain(|entry| entry.reason != LEGACY_SPAM_REASON);
            entries
        }
        Err(e) => {
            tracing::warn!("failed to decode logs from {path:?}: {e}");
            VecDeque::new()
        }
    }
}
