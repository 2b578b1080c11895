//! Jiggler Agent CLI
//!
//! Keeps the desktop session awake by simulating cursor activity.

use clap::{Parser, Subcommand};
use crossbeam_channel::bounded;
use jiggler_agent::{
    config::{self, Preferences},
    controller::{ActivityController, Collaborators},
    platform::{
        check_permission, DesktopNotifier, EventMonitor, HostLoginItems, HostPermissionGate,
        HostPointerDevice, LoggingPresentation, MovementWatcher,
    },
    power,
    store::{ActivityLog, StateStore},
    VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "jiggler")]
#[command(version = VERSION)]
#[command(about = "Simulates cursor activity to keep the desktop session awake", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent in the foreground
    Start,

    /// Turn simulated activity on
    Enable,

    /// Turn simulated activity off
    Disable,

    /// Toggle simulated activity
    Toggle,

    /// Update preferences
    Set {
        /// Pixel offset of each simulated move (10-200)
        #[arg(long)]
        distance: Option<f64>,

        /// Seconds between simulated moves
        #[arg(long)]
        interval: Option<f64>,

        /// Prune log entries older than this many days (0 = never)
        #[arg(long)]
        retention_days: Option<u32>,

        /// Register/unregister OS autostart
        #[arg(long)]
        launch_at_login: Option<bool>,

        /// Notify on start/stop transitions
        #[arg(long)]
        notify: Option<bool>,

        /// Stop simulating when real mouse movement is detected
        #[arg(long)]
        stop_on_movement: Option<bool>,

        /// Show the app in the dock
        #[arg(long)]
        show_in_dock: Option<bool>,

        /// Show the menu bar icon
        #[arg(long)]
        show_menu_bar_icon: Option<bool>,

        /// Restore the previous on/off state at launch
        #[arg(long)]
        restore_previous_state: Option<bool>,
    },

    /// Show agent status
    Status,

    /// Print the activity log
    Logs,

    /// Export the activity log to a text file
    Export {
        /// Output file (default: jiggler-logs.txt)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Clear the activity log
    ClearLogs,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start => cmd_start(),
        Commands::Enable => cmd_set_manual(Some(true)),
        Commands::Disable => cmd_set_manual(Some(false)),
        Commands::Toggle => cmd_set_manual(None),
        Commands::Set {
            distance,
            interval,
            retention_days,
            launch_at_login,
            notify,
            stop_on_movement,
            show_in_dock,
            show_menu_bar_icon,
            restore_previous_state,
        } => cmd_set(SetArgs {
            distance,
            interval,
            retention_days,
            launch_at_login,
            notify,
            stop_on_movement,
            show_in_dock,
            show_menu_bar_icon,
            restore_previous_state,
        }),
        Commands::Status => cmd_status(),
        Commands::Logs => cmd_logs(),
        Commands::Export { output } => cmd_export(output),
        Commands::ClearLogs => cmd_clear_logs(),
        Commands::Config => cmd_config(),
    }
}

fn cmd_start() {
    println!("Jiggler Agent v{VERSION}");
    println!();

    if !check_permission() {
        eprintln!("Warning: input simulation permission not granted.");
        eprintln!("Simulated activity cannot be enabled until it is.");
        eprintln!();
        eprintln!("To grant permission on macOS:");
        eprintln!("1. Open System Settings > Privacy & Security > Accessibility");
        eprintln!("2. Add this application to the allowed list");
        eprintln!();
    }

    let state = StateStore::new(config::state_path());
    let log = ActivityLog::open(config::logs_path());

    let (sender, receiver) = bounded(1024);
    let monitor = Arc::new(EventMonitor::new(sender));
    if let Err(e) = monitor.start() {
        eprintln!("Error starting event monitor: {e}");
        std::process::exit(1);
    }

    let collaborators = Collaborators {
        permissions: Arc::new(HostPermissionGate),
        login_items: Arc::new(HostLoginItems),
        notifier: Arc::new(DesktopNotifier),
        presentation: Arc::new(LoggingPresentation),
        watcher: monitor.clone() as Arc<dyn MovementWatcher>,
        pointer: Arc::new(HostPointerDevice),
    };

    let mut controller = ActivityController::launch(state, log, collaborators);

    println!("Simulate activity: {}", controller.status_text());
    println!("  Distance: {} px", controller.preferences().jiggle_distance);
    println!("  Interval: {}s", controller.preferences().jiggle_interval);
    println!(
        "  Stop on mouse movement: {}",
        if controller.preferences().stop_on_mouse_movement {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Toggle with Ctrl+Option+J or `jiggler toggle`.");
    println!("Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    // `jiggler enable/disable/set` control a running agent by editing the
    // snapshot file. The poll is edge-triggered on file content so the
    // agent's own background writes are not replayed as commands.
    let control = StateStore::new(config::state_path());
    let mut last_seen = controller.snapshot();
    let mut last_poll = Instant::now();

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => controller.handle(event),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                eprintln!("Event monitor disconnected unexpectedly");
                break;
            }
        }

        if last_poll.elapsed() >= Duration::from_secs(1) {
            if let Some(snapshot) = control.load() {
                if snapshot != last_seen {
                    controller.set_preferences(snapshot.preferences.clone(), "Preferences");
                    controller.set_manual_activity(snapshot.manual_simulate_activity, "Manual");
                    last_seen = controller.snapshot();
                }
            }
            last_poll = Instant::now();
        }
    }

    println!();
    println!("Stopping...");
    monitor.stop();
    drop(controller);
    println!("Stopped.");
}

fn cmd_set_manual(requested: Option<bool>) {
    let store = StateStore::new(config::state_path());
    let mut snapshot = store.load().unwrap_or_default();
    let value = requested.unwrap_or(!snapshot.manual_simulate_activity);
    snapshot.manual_simulate_activity = value;

    if let Err(e) = store.save_blocking(&snapshot) {
        eprintln!("Error saving state: {e}");
        std::process::exit(1);
    }

    if value {
        println!("Simulated activity requested on.");
        println!("A running agent applies it within a second (permission is checked there).");
    } else {
        println!("Simulated activity turned off.");
    }
}

struct SetArgs {
    distance: Option<f64>,
    interval: Option<f64>,
    retention_days: Option<u32>,
    launch_at_login: Option<bool>,
    notify: Option<bool>,
    stop_on_movement: Option<bool>,
    show_in_dock: Option<bool>,
    show_menu_bar_icon: Option<bool>,
    restore_previous_state: Option<bool>,
}

fn cmd_set(args: SetArgs) {
    let store = StateStore::new(config::state_path());
    let mut snapshot = store.load().unwrap_or_default();
    let prefs = &mut snapshot.preferences;

    if let Some(distance) = args.distance {
        prefs.jiggle_distance = Preferences::clamp_distance(distance);
    }
    if let Some(interval) = args.interval {
        if !interval.is_finite() || interval <= 0.0 {
            eprintln!("Error: interval must be a positive number of seconds");
            std::process::exit(1);
        }
        prefs.jiggle_interval = interval;
    }
    if let Some(days) = args.retention_days {
        prefs.log_retention_days = days;
    }
    if let Some(value) = args.launch_at_login {
        prefs.launch_at_login = value;
    }
    if let Some(value) = args.notify {
        prefs.notify_on_start_stop = value;
    }
    if let Some(value) = args.stop_on_movement {
        prefs.stop_on_mouse_movement = value;
    }
    if let Some(value) = args.show_in_dock {
        prefs.show_in_dock = value;
    }
    if let Some(value) = args.show_menu_bar_icon {
        prefs.show_menu_bar_icon = value;
    }
    if let Some(value) = args.restore_previous_state {
        prefs.restore_previous_state = value;
    }

    if prefs.enforce_visibility() {
        println!(
            "Note: the menu bar icon was kept visible (dock and menu bar cannot both be hidden)."
        );
    }

    if let Err(e) = store.save_blocking(&snapshot) {
        eprintln!("Error saving preferences: {e}");
        std::process::exit(1);
    }

    println!("Preferences updated. A running agent applies them within a second.");
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot.preferences).unwrap_or_else(|_| "Error".to_string())
    );
}

fn cmd_status() {
    let store = StateStore::new(config::state_path());
    let snapshot = store.load().unwrap_or_default();

    println!("Jiggler Agent Status");
    println!("====================");
    println!();

    let has_permission = check_permission();
    println!(
        "Input simulation permission: {}",
        if has_permission {
            "Granted ✓"
        } else {
            "Not granted ✗"
        }
    );
    println!();

    println!(
        "Simulate activity (requested): {}",
        if snapshot.manual_simulate_activity {
            "on"
        } else {
            "off"
        }
    );
    println!();

    let prefs = &snapshot.preferences;
    println!("Preferences:");
    println!("  Jiggle distance: {} px", prefs.jiggle_distance);
    println!("  Jiggle interval: {}s", prefs.jiggle_interval);
    println!("  Stop on mouse movement: {}", prefs.stop_on_mouse_movement);
    println!("  Notify on start/stop: {}", prefs.notify_on_start_stop);
    println!("  Launch at login: {}", prefs.launch_at_login);
    println!("  Log retention: {} days", prefs.log_retention_days);
    println!();

    if let Some(pct) = power::battery_percentage() {
        println!("Battery: {pct}%");
    }
    println!("State file: {:?}", config::state_path());
}

fn cmd_logs() {
    let log = ActivityLog::open(config::logs_path());
    if log.is_empty() {
        println!("No log entries.");
        return;
    }
    println!("{}", log.export_text());
}

fn cmd_export(output: Option<PathBuf>) {
    let log = ActivityLog::open(config::logs_path());
    let path = output.unwrap_or_else(|| PathBuf::from("jiggler-logs.txt"));

    match std::fs::write(&path, log.export_text()) {
        Ok(_) => println!("Exported {} entries to {path:?}", log.len()),
        Err(e) => {
            eprintln!("Error writing export: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_clear_logs() {
    let mut log = ActivityLog::open(config::logs_path());
    log.clear();
    if let Err(e) = log.save_blocking() {
        eprintln!("Error saving logs: {e}");
        std::process::exit(1);
    }
    println!("Activity log cleared.");
}

fn cmd_config() {
    let store = StateStore::new(config::state_path());
    let snapshot = store.load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("State file: {:?}", config::state_path());
    println!("Log file: {:?}", config::logs_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
