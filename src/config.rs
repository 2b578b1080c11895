//! User preferences and file locations for the jiggler agent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest accepted jiggle distance in pixels.
pub const MIN_JIGGLE_DISTANCE: f64 = 10.0;
/// Largest accepted jiggle distance in pixels.
pub const MAX_JIGGLE_DISTANCE: f64 = 200.0;

/// Default pixel offset of a simulated move.
pub const DEFAULT_JIGGLE_DISTANCE: f64 = 50.0;

/// Default seconds between simulated moves.
pub const DEFAULT_JIGGLE_INTERVAL_SECS: f64 = 5.0;
/// The historical default interval, rewritten to the current default on load.
const LEGACY_JIGGLE_INTERVAL_SECS: f64 = 60.0;

/// User-configurable preferences.
///
/// Field names are serialized in camelCase so snapshot files written by
/// earlier releases remain readable. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Register/unregister OS autostart.
    pub launch_at_login: bool,
    /// Emit a notification on activation transitions.
    pub notify_on_start_stop: bool,
    /// Prune log entries older than this many days (0 = never prune).
    pub log_retention_days: u32,
    /// Persisted user intent to restore the manual flag on launch.
    pub restore_previous_state: bool,
    /// Pixel offset of a simulated move.
    pub jiggle_distance: f64,
    /// Seconds between simulated moves.
    pub jiggle_interval: f64,
    /// Show the app in the dock (presentation collaborator only).
    pub show_in_dock: bool,
    /// Show the menu bar icon (presentation collaborator only).
    pub show_menu_bar_icon: bool,
    /// Stop simulation when genuine mouse movement is detected.
    pub stop_on_mouse_movement: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            launch_at_login: false,
            notify_on_start_stop: true,
            log_retention_days: 30,
            restore_previous_state: true,
            jiggle_distance: DEFAULT_JIGGLE_DISTANCE,
            jiggle_interval: DEFAULT_JIGGLE_INTERVAL_SECS,
            show_in_dock: false,
            show_menu_bar_icon: true,
            stop_on_mouse_movement: true,
        }
    }
}

impl Preferences {
    /// Enforce that at least one of the dock icon and menu bar icon is
    /// visible. If a mutation would hide both, the menu bar icon is snapped
    /// back on. Returns true if a correction was applied.
    pub fn enforce_visibility(&mut self) -> bool {
        if !self.show_in_dock && !self.show_menu_bar_icon {
            self.show_menu_bar_icon = true;
            return true;
        }
        false
    }

    /// One-time compatibility fix, applied on every load (idempotent):
    /// snapshots written when the default interval was 60 seconds are
    /// rewritten to the current 5 second default.
    pub fn migrate(&mut self) {
        if self.jiggle_interval == LEGACY_JIGGLE_INTERVAL_SECS {
            self.jiggle_interval = DEFAULT_JIGGLE_INTERVAL_SECS;
        }
    }

    /// Clamp a requested jiggle distance into the accepted range.
    pub fn clamp_distance(value: f64) -> f64 {
        value.clamp(MIN_JIGGLE_DISTANCE, MAX_JIGGLE_DISTANCE)
    }
}

/// Directory holding the snapshot and log files.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jiggler-agent")
}

/// Path of the persisted snapshot (preferences + manual flag).
pub fn state_path() -> PathBuf {
    data_dir().join("state.json")
}

/// Path of the persisted activity log.
pub fn logs_path() -> PathBuf {
    data_dir().join("logs.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert!(!prefs.launch_at_login);
        assert!(prefs.notify_on_start_stop);
        assert_eq!(prefs.log_retention_days, 30);
        assert_eq!(prefs.jiggle_distance, 50.0);
        assert_eq!(prefs.jiggle_interval, 5.0);
        assert!(!prefs.show_in_dock);
        assert!(prefs.show_menu_bar_icon);
    }

    #[test]
    fn test_visibility_invariant() {
        let mut prefs = Preferences {
            show_in_dock: false,
            show_menu_bar_icon: false,
            ..Preferences::default()
        };
        assert!(prefs.enforce_visibility());
        assert!(prefs.show_menu_bar_icon);

        // Already valid combinations are left alone.
        let mut prefs = Preferences {
            show_in_dock: true,
            show_menu_bar_icon: false,
            ..Preferences::default()
        };
        assert!(!prefs.enforce_visibility());
        assert!(!prefs.show_menu_bar_icon);
    }

    #[test]
    fn test_interval_migration() {
        let mut prefs = Preferences {
            jiggle_interval: 60.0,
            ..Preferences::default()
        };
        prefs.migrate();
        assert_eq!(prefs.jiggle_interval, 5.0);

        // Any other value is preserved.
        let mut prefs = Preferences {
            jiggle_interval: 7.5,
            ..Preferences::default()
        };
        prefs.migrate();
        assert_eq!(prefs.jiggle_interval, 7.5);

        // Migration is idempotent.
        prefs.jiggle_interval = 60.0;
        prefs.migrate();
        prefs.migrate();
        assert_eq!(prefs.jiggle_interval, 5.0);
    }

    #[test]
    fn test_distance_clamping() {
        assert_eq!(Preferences::clamp_distance(5.0), 10.0);
        assert_eq!(Preferences::clamp_distance(50.0), 50.0);
        assert_eq!(Preferences::clamp_distance(1000.0), 200.0);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        // A snapshot written before stopOnMouseMovement existed.
        let json = r#"{"launchAtLogin":true,"jiggleDistance":80.0}"#;
        let prefs: Preferences = serde_json::from_str(json).unwrap();
        assert!(prefs.launch_at_login);
        assert_eq!(prefs.jiggle_distance, 80.0);
        assert!(prefs.stop_on_mouse_movement);
        assert!(prefs.show_menu_bar_icon);
    }
}
