//! Jiggler Agent - keeps the desktop session awake by simulating cursor
//! activity.
//!
//! While enabled, the agent periodically posts a small synthetic pointer
//! movement and reversal ("jiggle") so the OS or a remote session never
//! marks the user idle. Preferences and an activity log are persisted as
//! JSON; a global shortcut, CLI commands, and detected real mouse movement
//! all feed a single controller that owns the active state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Jiggler Agent                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  shortcut tap ──┐                       ┌──▶ Jiggle Engine  │
//! │  movement tap ──┼──▶ Activity ──────────┤    (timer thread) │
//! │  CLI / poll  ───┘    Controller         └──▶ Activity Log   │
//! │                         │                                   │
//! │                         ▼                                   │
//! │                   Snapshot Store (state.json / logs.json)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! OS specifics (permission probing, synthetic events, notifications,
//! login items) live behind narrow collaborator traits in [`platform`],
//! with a noop backend for non-macOS hosts.

pub mod config;
pub mod controller;
pub mod engine;
pub mod platform;
pub mod power;
pub mod shortcut;
pub mod store;

// Re-export key types at crate root for convenience
pub use config::Preferences;
pub use controller::{ActivityController, Collaborators, ControlEvent};
pub use engine::JiggleEngine;
pub use platform::{
    LoginItemRegistrar, MovementWatcher, Notifier, PermissionGate, Point, PointerDevice,
    Presentation,
};
pub use store::{ActivityLog, LogEntry, Snapshot, StateStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
