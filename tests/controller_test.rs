//! Integration tests for the activity controller, using fake collaborators
//! in place of the OS.

use jiggler_agent::config::Preferences;
use jiggler_agent::controller::{ActivityController, Collaborators, ControlEvent};
use jiggler_agent::platform::{
    LoginItemRegistrar, MovementWatcher, Notifier, PermissionGate, Point, PointerDevice,
    Presentation,
};
use jiggler_agent::store::{ActivityLog, LogEntry, Snapshot, StateStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct FakePermissions {
    granted: AtomicBool,
    prompts: AtomicUsize,
}

impl FakePermissions {
    fn new(granted: bool) -> Arc<Self> {
        Arc::new(Self {
            granted: AtomicBool::new(granted),
            prompts: AtomicUsize::new(0),
        })
    }

    fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl PermissionGate for FakePermissions {
    fn is_input_simulation_permitted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_permission_prompt(&self) {
        self.prompts.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakeRegistrar {
    last: Mutex<Option<bool>>,
}

impl LoginItemRegistrar for FakeRegistrar {
    fn set_launch_at_login(&self, enabled: bool) {
        *self.last.lock().unwrap() = Some(enabled);
    }
}

#[derive(Default)]
struct FakeNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl FakeNotifier {
    fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for FakeNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}

#[derive(Default)]
struct FakePresentation {
    last: Mutex<Option<(bool, bool)>>,
}

impl Presentation for FakePresentation {
    fn apply_visibility(&self, show_in_dock: bool, show_menu_bar_icon: bool) {
        *self.last.lock().unwrap() = Some((show_in_dock, show_menu_bar_icon));
    }
}

#[derive(Default)]
struct FakeWatcher {
    armed: AtomicBool,
}

impl MovementWatcher for FakeWatcher {
    fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::SeqCst);
    }
}

/// A pointer that cannot be read, so the engine's moves are silent no-ops
/// and tests stay deterministic.
struct UnreadablePointer;

impl PointerDevice for UnreadablePointer {
    fn current_position(&self) -> Option<Point> {
        None
    }

    fn post_move(&self, _to: Point) {}
}

struct RecordingPointer {
    moves: Mutex<Vec<Point>>,
}

impl PointerDevice for RecordingPointer {
    fn current_position(&self) -> Option<Point> {
        Some(Point { x: 10.0, y: 20.0 })
    }

    fn post_move(&self, to: Point) {
        self.moves.lock().unwrap().push(to);
    }
}

struct Harness {
    controller: ActivityController,
    permissions: Arc<FakePermissions>,
    registrar: Arc<FakeRegistrar>,
    notifier: Arc<FakeNotifier>,
    presentation: Arc<FakePresentation>,
    watcher: Arc<FakeWatcher>,
    _dir: tempfile::TempDir,
}

fn launch(granted: bool) -> Harness {
    launch_with(granted, None, Arc::new(UnreadablePointer))
}

fn launch_with(
    granted: bool,
    snapshot: Option<Snapshot>,
    pointer: Arc<dyn PointerDevice>,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let state = StateStore::new(dir.path().join("state.json"));
    if let Some(snapshot) = &snapshot {
        state.save_blocking(snapshot).unwrap();
    }
    let log = ActivityLog::open(dir.path().join("logs.json"));

    let permissions = FakePermissions::new(granted);
    let registrar = Arc::new(FakeRegistrar::default());
    let notifier = Arc::new(FakeNotifier::default());
    let presentation = Arc::new(FakePresentation::default());
    let watcher = Arc::new(FakeWatcher::default());

    let collaborators = Collaborators {
        permissions: permissions.clone(),
        login_items: registrar.clone(),
        notifier: notifier.clone(),
        presentation: presentation.clone(),
        watcher: watcher.clone(),
        pointer,
    };

    Harness {
        controller: ActivityController::launch(state, log, collaborators),
        permissions,
        registrar,
        notifier,
        presentation,
        watcher,
        _dir: dir,
    }
}

#[test]
fn test_fresh_install_defaults() {
    let h = launch(true);

    assert!(!h.controller.manual_simulate_activity());
    assert!(!h.controller.is_active());
    assert_eq!(h.controller.status_text(), "Off");
    assert_eq!(h.controller.menu_bar_icon_label(), "cursorarrow");
    assert!(h.controller.log_entries().is_empty());

    // Default preference for stop-on-movement arms the watcher at launch.
    assert!(h.watcher.armed.load(Ordering::SeqCst));
}

#[test]
fn test_enable_with_permission_denied() {
    let mut h = launch(false);

    h.controller.set_manual_activity(true, "Manual");

    assert!(!h.controller.manual_simulate_activity());
    assert!(!h.controller.is_active());
    assert_eq!(h.permissions.prompts(), 1);
    assert!(h.controller.log_entries().is_empty());
    assert!(h.notifier.messages().is_empty());
}

#[test]
fn test_enable_with_permission_granted() {
    let mut h = launch(true);

    h.controller.set_manual_activity(true, "Manual");

    assert!(h.controller.is_active());
    assert_eq!(h.controller.status_text(), "On");
    assert_eq!(h.controller.menu_bar_icon_label(), "cursorarrow.motionlines");

    let entries = h.controller.log_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "Jiggler Enabled");
    assert_eq!(entries[0].reason, "Manual");

    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "Jiggler");
    assert_eq!(messages[0].1, "Jiggler enabled.");
}

#[test]
fn test_repeated_evaluation_logs_each_transition_once() {
    let mut h = launch(true);

    h.controller.set_manual_activity(true, "Manual");
    assert_eq!(h.controller.log_entries().len(), 1);

    // Re-asserting the same intent is a no-op.
    h.controller.set_manual_activity(true, "Manual");
    assert_eq!(h.controller.log_entries().len(), 1);

    // A preference change re-evaluates without crossing the boundary.
    let mut prefs = h.controller.preferences().clone();
    prefs.jiggle_distance = 120.0;
    h.controller.set_preferences(prefs, "Preferences");
    assert_eq!(h.controller.log_entries().len(), 1);

    h.controller.set_manual_activity(false, "Manual");
    assert_eq!(h.controller.log_entries().len(), 2);
    assert_eq!(h.controller.log_entries()[0].action, "Jiggler Disabled");
}

#[test]
fn test_shortcut_toggle_event() {
    let mut h = launch(true);

    h.controller.handle(ControlEvent::ShortcutToggle);
    assert!(h.controller.is_active());
    assert_eq!(h.controller.log_entries()[0].reason, "Manual");

    h.controller.handle(ControlEvent::ShortcutToggle);
    assert!(!h.controller.is_active());
}

#[test]
fn test_real_movement_stops_simulation() {
    let mut h = launch(true);
    h.controller.set_manual_activity(true, "Manual");

    h.controller.handle(ControlEvent::RealMovement);

    assert!(!h.controller.is_active());
    let entries = h.controller.log_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "Jiggler Disabled");
    assert_eq!(entries[0].reason, "User mouse movement detected");
}

#[test]
fn test_real_movement_ignored_when_pref_disabled() {
    let mut h = launch(true);
    h.controller.set_manual_activity(true, "Manual");

    let mut prefs = h.controller.preferences().clone();
    prefs.stop_on_mouse_movement = false;
    h.controller.set_preferences(prefs, "Preferences");
    assert!(!h.watcher.armed.load(Ordering::SeqCst));

    h.controller.handle(ControlEvent::RealMovement);
    assert!(h.controller.is_active());
}

#[test]
fn test_real_movement_ignored_when_inactive() {
    let mut h = launch(true);
    h.controller.handle(ControlEvent::RealMovement);
    assert!(h.controller.log_entries().is_empty());
}

#[test]
fn test_visibility_invariant_corrected() {
    let mut h = launch(true);

    let mut prefs = h.controller.preferences().clone();
    prefs.show_in_dock = false;
    prefs.show_menu_bar_icon = false;
    h.controller.set_preferences(prefs, "Preferences");

    assert!(h.controller.preferences().show_menu_bar_icon);
}

#[test]
fn test_visibility_change_reaches_presentation() {
    let mut h = launch(true);

    let mut prefs = h.controller.preferences().clone();
    prefs.show_in_dock = true;
    h.controller.set_preferences(prefs, "Preferences");

    assert_eq!(*h.presentation.last.lock().unwrap(), Some((true, true)));
}

#[test]
fn test_launch_at_login_diff_invokes_registrar() {
    let mut h = launch(true);

    // An unrelated change leaves the registrar untouched.
    let mut prefs = h.controller.preferences().clone();
    prefs.jiggle_distance = 90.0;
    h.controller.set_preferences(prefs, "Preferences");
    assert_eq!(*h.registrar.last.lock().unwrap(), None);

    let mut prefs = h.controller.preferences().clone();
    prefs.launch_at_login = true;
    h.controller.set_preferences(prefs, "Preferences");
    assert_eq!(*h.registrar.last.lock().unwrap(), Some(true));
}

#[test]
fn test_retention_change_prunes_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs.json");

    // Seed an entry old enough to be pruned at 30 days retention.
    let old = LogEntry::at(
        chrono::Utc::now() - chrono::Duration::days(40),
        "Jiggler Enabled",
        "Manual",
    );
    std::fs::write(&log_path, serde_json::to_string(&vec![old]).unwrap()).unwrap();

    let state = StateStore::new(dir.path().join("state.json"));
    let mut snapshot = Snapshot::default();
    snapshot.preferences.log_retention_days = 0;
    state.save_blocking(&snapshot).unwrap();

    let log = ActivityLog::open(log_path);
    let collaborators = Collaborators {
        permissions: FakePermissions::new(true),
        login_items: Arc::new(FakeRegistrar::default()),
        notifier: Arc::new(FakeNotifier::default()),
        presentation: Arc::new(FakePresentation::default()),
        watcher: Arc::new(FakeWatcher::default()),
        pointer: Arc::new(UnreadablePointer),
    };
    let mut controller = ActivityController::launch(state, log, collaborators);

    // Retention 0 at launch keeps the old entry.
    assert_eq!(controller.log_entries().len(), 1);

    let mut prefs = controller.preferences().clone();
    prefs.log_retention_days = 30;
    controller.set_preferences(prefs, "Preferences");
    assert!(controller.log_entries().is_empty());
}

#[test]
fn test_restored_state_gated_by_permission() {
    let snapshot = Snapshot {
        preferences: Preferences::default(),
        manual_simulate_activity: true,
    };
    let h = launch_with(false, Some(snapshot), Arc::new(UnreadablePointer));

    assert!(!h.controller.manual_simulate_activity());
    assert!(!h.controller.is_active());
    // No transition happened, so nothing was logged.
    assert!(h.controller.log_entries().is_empty());
}

#[test]
fn test_restored_state_enables_at_launch() {
    let snapshot = Snapshot {
        preferences: Preferences::default(),
        manual_simulate_activity: true,
    };
    let h = launch_with(true, Some(snapshot), Arc::new(UnreadablePointer));

    assert!(h.controller.is_active());
    assert_eq!(h.controller.status_text(), "On");
    let entries = h.controller.log_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "Jiggler Enabled");
    assert_eq!(entries[0].reason, "Launch");
}

#[test]
fn test_interval_migration_applied_at_launch() {
    let mut snapshot = Snapshot::default();
    snapshot.preferences.jiggle_interval = 60.0;
    let h = launch_with(true, Some(snapshot), Arc::new(UnreadablePointer));
    assert_eq!(h.controller.preferences().jiggle_interval, 5.0);

    let mut snapshot = Snapshot::default();
    snapshot.preferences.jiggle_interval = 12.0;
    let h = launch_with(true, Some(snapshot), Arc::new(UnreadablePointer));
    assert_eq!(h.controller.preferences().jiggle_interval, 12.0);
}

#[test]
fn test_notifications_suppressed_when_pref_off() {
    let mut snapshot = Snapshot::default();
    snapshot.preferences.notify_on_start_stop = false;
    let mut h = launch_with(true, Some(snapshot), Arc::new(UnreadablePointer));

    h.controller.set_manual_activity(true, "Manual");
    assert_eq!(h.controller.log_entries().len(), 1);
    assert!(h.notifier.messages().is_empty());
}

#[test]
fn test_engine_posts_moves_while_active() {
    let pointer = Arc::new(RecordingPointer {
        moves: Mutex::new(Vec::new()),
    });
    let mut h = launch_with(true, None, pointer.clone());

    h.controller.set_manual_activity(true, "Manual");
    // The immediate move pair takes ~300ms of visibility/grace delays.
    std::thread::sleep(std::time::Duration::from_millis(450));
    h.controller.set_manual_activity(false, "Manual");

    let moves = pointer.moves.lock().unwrap().clone();
    assert!(moves.len() >= 2);
    assert_eq!(moves[0], Point { x: 60.0, y: 20.0 });
    assert_eq!(moves[1], Point { x: 10.0, y: 20.0 });
}

#[test]
fn test_export_and_clear_logs() {
    let mut h = launch(true);

    h.controller.set_manual_activity(true, "Manual");
    let text = h.controller.export_logs_text();
    assert!(text.contains("Jiggler Enabled - Manual"));
    assert!(text.starts_with('['));

    h.controller.clear_logs();
    assert!(h.controller.export_logs_text().is_empty());
}
