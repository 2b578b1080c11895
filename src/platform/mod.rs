//! Collaborator interfaces between the controller and the host OS.
//!
//! The controller only ever talks to the OS through these narrow traits, so
//! tests substitute fakes and non-macOS hosts fall back to noop
//! implementations, mirroring the macos/noop split used for event capture.

pub mod notify;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(not(target_os = "macos"))]
pub mod noop;

#[cfg(target_os = "macos")]
pub use macos::{
    check_permission, MacOsEventMonitor, MacOsLoginItems, MacOsPermissionGate, MacOsPointerDevice,
    MonitorError,
};

// Platform-agnostic names for the host implementations. The structs are
// re-exported via `use` renames (not type aliases) so `HostPermissionGate`
// etc. stay usable as constructor expressions.
#[cfg(target_os = "macos")]
pub use macos::{
    MacOsLoginItems as HostLoginItems, MacOsPermissionGate as HostPermissionGate,
    MacOsPointerDevice as HostPointerDevice,
};
#[cfg(target_os = "macos")]
pub type EventMonitor = MacOsEventMonitor;

#[cfg(not(target_os = "macos"))]
pub use noop::{
    check_permission, MonitorError, NoopEventMonitor, NoopLoginItems, NoopPermissionGate,
    NoopPointerDevice,
};

#[cfg(not(target_os = "macos"))]
pub use noop::{
    NoopLoginItems as HostLoginItems, NoopPermissionGate as HostPermissionGate,
    NoopPointerDevice as HostPointerDevice,
};
#[cfg(not(target_os = "macos"))]
pub type EventMonitor = NoopEventMonitor;

/// A pointer position in global display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Gate for the simulate-input capability.
pub trait PermissionGate: Send + Sync {
    fn is_input_simulation_permitted(&self) -> bool;
    /// Ask the host to surface its permission settings to the user.
    fn request_permission_prompt(&self);
}

/// Best-effort OS autostart registration. Failures are swallowed.
pub trait LoginItemRegistrar: Send + Sync {
    fn set_launch_at_login(&self, enabled: bool);
}

/// Fire-and-forget user notification delivery.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// The opaque input-simulation primitive.
pub trait PointerDevice: Send + Sync {
    /// Current pointer position, or `None` if it cannot be read.
    fn current_position(&self) -> Option<Point>;
    /// Post a synthetic move to the given position.
    fn post_move(&self, to: Point);
}

/// Host surface visibility (dock icon / menu bar icon).
pub trait Presentation: Send + Sync {
    fn apply_visibility(&self, show_in_dock: bool, show_menu_bar_icon: bool);
}

/// Arms and disarms delivery of real-movement events to the agent loop.
pub trait MovementWatcher: Send + Sync {
    fn set_armed(&self, armed: bool);
}

/// Notifier backed by the host notification mechanism.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        notify::deliver(title, body);
    }
}

/// Presentation for the headless agent: the CLI has no dock or menu bar
/// surface of its own, so visibility changes are only recorded. A GUI host
/// embedding the library supplies its own implementation.
pub struct LoggingPresentation;

impl Presentation for LoggingPresentation {
    fn apply_visibility(&self, show_in_dock: bool, show_menu_bar_icon: bool) {
        tracing::info!(
            "presentation visibility: dock={show_in_dock} menu_bar={show_menu_bar_icon}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // The Host* names must be usable as constructor expressions, the way
    // the agent loop wires them into its collaborator set.
    #[test]
    fn test_host_collaborators_construct_as_values() {
        let _: Arc<dyn PermissionGate> = Arc::new(HostPermissionGate);
        let _: Arc<dyn LoginItemRegistrar> = Arc::new(HostLoginItems);
        let _: Arc<dyn PointerDevice> = Arc::new(HostPointerDevice);
        let _: Arc<dyn Notifier> = Arc::new(DesktopNotifier);
    }
}
