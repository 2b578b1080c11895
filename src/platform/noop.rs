//! Non-macOS (noop) collaborators.
//!
//! These exist so the crate (and binary) can compile and run everywhere
//! without the CoreGraphics dependencies. The agent runs, persists state,
//! and logs transitions, but no synthetic input is produced.

use crate::controller::ControlEvent;
use crate::platform::{LoginItemRegistrar, MovementWatcher, PermissionGate, Point, PointerDevice};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};

/// There is no input-simulation permission gate outside macOS.
pub fn check_permission() -> bool {
    true
}

/// Permission gate that always grants.
pub struct NoopPermissionGate;

impl PermissionGate for NoopPermissionGate {
    fn is_input_simulation_permitted(&self) -> bool {
        check_permission()
    }

    fn request_permission_prompt(&self) {}
}

/// Login item registration is not supported; requests are recorded only.
pub struct NoopLoginItems;

impl LoginItemRegistrar for NoopLoginItems {
    fn set_launch_at_login(&self, enabled: bool) {
        tracing::info!("launch at login ignored on this platform (requested: {enabled})");
    }
}

/// A pointer device that cannot read or move the cursor.
///
/// `current_position` returning `None` makes every jiggle attempt a silent
/// no-op, which is the documented degradation path.
pub struct NoopPointerDevice;

impl PointerDevice for NoopPointerDevice {
    fn current_position(&self) -> Option<Point> {
        None
    }

    fn post_move(&self, _to: Point) {}
}

/// Errors from the event monitor.
#[derive(Debug)]
pub enum MonitorError {
    AlreadyRunning,
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::AlreadyRunning => write!(f, "Event monitor is already running"),
        }
    }
}

impl std::error::Error for MonitorError {}

/// An event monitor that never emits events.
pub struct NoopEventMonitor {
    _sender: Sender<ControlEvent>,
    armed: AtomicBool,
    running: AtomicBool,
}

impl NoopEventMonitor {
    pub fn new(sender: Sender<ControlEvent>) -> Self {
        Self {
            _sender: sender,
            armed: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }

    pub fn start(&self) -> Result<(), MonitorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::AlreadyRunning);
        }
        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl MovementWatcher for NoopEventMonitor {
    fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::SeqCst);
    }
}
