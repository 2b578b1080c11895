//! macOS collaborators: CGEvent-based pointer simulation, a listen-only
//! event tap for real-movement and shortcut detection, permission probing,
//! and LaunchAgent registration.

use crate::controller::ControlEvent;
use crate::platform::{LoginItemRegistrar, MovementWatcher, PermissionGate, Point, PointerDevice};
use crate::shortcut::TOGGLE_CHORD;
use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
    CGEventType, CGMouseButton, CallbackResult, EventField,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Check whether the process may observe and post input events.
///
/// macOS has no direct query for this; creating a passive tap fails when
/// the process is not in the trust database, which covers both directions.
pub fn check_permission() -> bool {
    CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::MouseMoved],
        |_proxy, _type, _event| CallbackResult::Keep,
    )
    .is_ok()
}

/// Permission gate backed by the event-tap probe.
pub struct MacOsPermissionGate;

impl PermissionGate for MacOsPermissionGate {
    fn is_input_simulation_permitted(&self) -> bool {
        check_permission()
    }

    fn request_permission_prompt(&self) {
        let url = "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";
        if let Err(e) = std::process::Command::new("open").arg(url).output() {
            tracing::warn!("failed to open accessibility settings: {e}");
        }
    }
}

/// Synthetic mouse events through CoreGraphics.
pub struct MacOsPointerDevice;

impl PointerDevice for MacOsPointerDevice {
    fn current_position(&self) -> Option<Point> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).ok()?;
        let event = CGEvent::new(source).ok()?;
        let location = event.location();
        Some(Point {
            x: location.x,
            y: location.y,
        })
    }

    fn post_move(&self, to: Point) {
        let source = match CGEventSource::new(CGEventSourceStateID::HIDSystemState) {
            Ok(source) => source,
            Err(_) => return,
        };
        match CGEvent::new_mouse_event(
            source,
            CGEventType::MouseMoved,
            CGPoint::new(to.x, to.y),
            CGMouseButton::Left,
        ) {
            Ok(event) => event.post(CGEventTapLocation::HID),
            Err(_) => tracing::debug!("failed to create synthetic move event"),
        }
    }
}

/// Login item registration via a per-user LaunchAgent.
///
/// Best-effort: failures (sandboxing, read-only home) are swallowed.
pub struct MacOsLoginItems;

const LAUNCH_AGENT_LABEL: &str = "com.jiggler.agent";

impl MacOsLoginItems {
    fn plist_path() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|home| {
            home.join("Library")
                .join("LaunchAgents")
                .join(format!("{LAUNCH_AGENT_LABEL}.plist"))
        })
    }

    fn plist_contents() -> Option<String> {
        let exe = std::env::current_exe().ok()?;
        Some(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{LAUNCH_AGENT_LABEL}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{}</string>
        <string>start</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
            exe.display()
        ))
    }
}

impl LoginItemRegistrar for MacOsLoginItems {
    fn set_launch_at_login(&self, enabled: bool) {
        let Some(path) = Self::plist_path() else {
            return;
        };
        if enabled {
            let Some(contents) = Self::plist_contents() else {
                return;
            };
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = std::fs::write(&path, contents) {
                tracing::debug!("could not register launch agent: {e}");
            }
        } else if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!("could not remove launch agent: {e}");
            }
        }
    }
}

/// Errors from the event monitor.
#[derive(Debug)]
pub enum MonitorError {
    AlreadyRunning,
    TapCreationFailed,
    RunLoopSourceFailed,
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::AlreadyRunning => write!(f, "Event monitor is already running"),
            MonitorError::TapCreationFailed => write!(f, "Failed to create CGEvent tap"),
            MonitorError::RunLoopSourceFailed => write!(f, "Failed to create run loop source"),
        }
    }
}

impl std::error::Error for MonitorError {}

/// Listen-only tap on mouse-moved and key-down events.
///
/// Mouse movement is forwarded to the agent loop only while armed; the
/// controller decides whether it is genuine (the jiggle engine flags its
/// own in-flight moves). Key-down events matching the toggle chord are
/// forwarded unconditionally. The headless agent never has input focus, so
/// the chord is observed rather than consumed.
pub struct MacOsEventMonitor {
    sender: Sender<ControlEvent>,
    armed: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl MacOsEventMonitor {
    pub fn new(sender: Sender<ControlEvent>) -> Self {
        Self {
            sender,
            armed: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            thread: Mutex::new(None),
        }
    }

    /// Start observing events on a background thread.
    pub fn start(&self) -> Result<(), MonitorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::AlreadyRunning);
        }

        let sender = self.sender.clone();
        let armed = self.armed.clone();
        let running = self.running.clone();

        let handle = thread::spawn(move || {
            if let Err(e) = run_event_loop(sender, running.clone(), armed) {
                tracing::warn!("event monitor stopped: {e}");
            }
            running.store(false, Ordering::SeqCst);
        });

        if let Ok(mut slot) = self.thread.lock() {
            *slot = Some(handle);
        }
        Ok(())
    }

    /// Stop observing. Synchronous and idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Ok(mut slot) = self.thread.lock() {
            if let Some(handle) = slot.take() {
                let _ = handle.join();
            }
        }
    }
}

impl MovementWatcher for MacOsEventMonitor {
    fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::SeqCst);
        tracing::debug!("movement watcher armed={armed}");
    }
}

impl Drop for MacOsEventMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_event_loop(
    sender: Sender<ControlEvent>,
    running: Arc<AtomicBool>,
    armed: Arc<AtomicBool>,
) -> Result<(), MonitorError> {
    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::MouseMoved, CGEventType::KeyDown],
        move |_proxy, event_type, event| {
            match event_type {
                CGEventType::MouseMoved => {
                    if armed.load(Ordering::SeqCst) {
                        // Don't block the tap if the agent loop is behind.
                        let _ = sender.try_send(ControlEvent::RealMovement);
                    }
                }
                CGEventType::KeyDown => {
                    let keycode =
                        event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
                    let flags = event.get_flags();
                    if TOGGLE_CHORD.matches(
                        flags.contains(CGEventFlags::CGEventFlagControl),
                        flags.contains(CGEventFlags::CGEventFlagAlternate),
                        keycode,
                    ) {
                        let _ = sender.try_send(ControlEvent::ShortcutToggle);
                    }
                }
                _ => {}
            }
            CallbackResult::Keep
        },
    )
    .map_err(|_| MonitorError::TapCreationFailed)?;

    let source = tap
        .mach_port()
        .create_runloop_source(0)
        .map_err(|_| MonitorError::RunLoopSourceFailed)?;

    let run_loop = CFRunLoop::get_current();
    unsafe {
        run_loop.add_source(&source, kCFRunLoopCommonModes);
    }

    tap.enable();

    while running.load(Ordering::SeqCst) {
        CFRunLoop::run_in_mode(
            unsafe { kCFRunLoopCommonModes },
            std::time::Duration::from_millis(100),
            false,
        );
    }

    Ok(())
}
