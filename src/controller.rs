//! Activity controller: the single authoritative decision of whether
//! simulated activity is running.
//!
//! Every external trigger (manual toggle, preference change, global
//! shortcut, detected real movement, launch) funnels into the controller,
//! which re-evaluates the active state, drives the jiggle engine, appends a
//! log entry on each transition, and persists the snapshot. The ordering
//! (validation, collaborator diffing, evaluation, persistence) is an
//! explicit sequential contract.

use crate::config::Preferences;
use crate::engine::JiggleEngine;
use crate::platform::{
    LoginItemRegistrar, MovementWatcher, Notifier, PermissionGate, PointerDevice, Presentation,
};
use crate::store::{ActivityLog, LogEntry, Snapshot, StateStore};
use std::sync::Arc;

const NOTIFICATION_TITLE: &str = "Jiggler";

/// Events delivered to the agent loop from platform listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// The global shortcut chord was pressed.
    ShortcutToggle,
    /// Genuine mouse movement arrived while the watcher was armed.
    RealMovement,
}

/// Collaborators injected into the controller.
pub struct Collaborators {
    pub permissions: Arc<dyn PermissionGate>,
    pub login_items: Arc<dyn LoginItemRegistrar>,
    pub notifier: Arc<dyn Notifier>,
    pub presentation: Arc<dyn Presentation>,
    pub watcher: Arc<dyn MovementWatcher>,
    pub pointer: Arc<dyn PointerDevice>,
}

pub struct ActivityController {
    preferences: Preferences,
    manual_simulate_activity: bool,
    /// Last evaluated value, so each boundary crossing is logged exactly once.
    last_active: bool,
    is_active: bool,
    engine: JiggleEngine,
    log: ActivityLog,
    state: StateStore,
    permissions: Arc<dyn PermissionGate>,
    login_items: Arc<dyn LoginItemRegistrar>,
    notifier: Arc<dyn Notifier>,
    presentation: Arc<dyn Presentation>,
    watcher: Arc<dyn MovementWatcher>,
}

impl ActivityController {
    /// Startup sequence: restore the snapshot (interval migration applied by
    /// the store), gate the restored manual flag by permission, prune the
    /// log by the loaded retention, and run the first evaluation.
    pub fn launch(state: StateStore, mut log: ActivityLog, collaborators: Collaborators) -> Self {
        let (mut preferences, mut manual) = match state.load() {
            Some(snapshot) => (snapshot.preferences, snapshot.manual_simulate_activity),
            None => (Preferences::default(), false),
        };
        preferences.enforce_visibility();

        if manual && !collaborators.permissions.is_input_simulation_permitted() {
            tracing::info!("restored active state dropped: input simulation not permitted");
            manual = false;
        }

        log.prune(preferences.log_retention_days);

        let engine = JiggleEngine::new(collaborators.pointer);
        let mut controller = Self {
            preferences,
            manual_simulate_activity: manual,
            last_active: false,
            is_active: false,
            engine,
            log,
            state,
            permissions: collaborators.permissions,
            login_items: collaborators.login_items,
            notifier: collaborators.notifier,
            presentation: collaborators.presentation,
            watcher: collaborators.watcher,
        };

        controller.presentation.apply_visibility(
            controller.preferences.show_in_dock,
            controller.preferences.show_menu_bar_icon,
        );
        controller
            .watcher
            .set_armed(controller.preferences.stop_on_mouse_movement);

        controller.evaluate("Launch");
        controller
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_active {
            "On"
        } else {
            "Off"
        }
    }

    pub fn menu_bar_icon_label(&self) -> &'static str {
        if self.is_active {
            "cursorarrow.motionlines"
        } else {
            "cursorarrow"
        }
    }

    pub fn manual_simulate_activity(&self) -> bool {
        self.manual_simulate_activity
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Route a platform event into the controller.
    pub fn handle(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::ShortcutToggle => self.toggle_manual_activity("Manual"),
            ControlEvent::RealMovement => self.on_real_movement(),
        }
    }

    /// Set the user's manual intent.
    ///
    /// Enabling requires the simulate-input capability: if it is not
    /// granted, intent stays off, the permission prompt collaborator is
    /// invoked, and no evaluation occurs.
    pub fn set_manual_activity(&mut self, requested: bool, reason: &str) {
        if requested == self.manual_simulate_activity {
            return;
        }

        if requested && !self.permissions.is_input_simulation_permitted() {
            tracing::info!("enable request blocked: input simulation not permitted");
            self.permissions.request_permission_prompt();
            // Reassert the reverted intent on disk so an external enable
            // request is not replayed on the next poll.
            self.persist();
            return;
        }

        self.manual_simulate_activity = requested;
        self.evaluate(reason);
    }

    pub fn toggle_manual_activity(&mut self, reason: &str) {
        self.set_manual_activity(!self.manual_simulate_activity, reason);
    }

    /// Replace the preferences, correcting the visibility invariant first,
    /// then invoking collaborators for each changed field.
    pub fn set_preferences(&mut self, new: Preferences, reason: &str) {
        let mut new = new;
        if new.enforce_visibility() {
            tracing::debug!("menu bar icon forced visible");
        }
        if new == self.preferences {
            return;
        }

        let old = std::mem::replace(&mut self.preferences, new);

        if old.launch_at_login != self.preferences.launch_at_login {
            self.login_items
                .set_launch_at_login(self.preferences.launch_at_login);
        }
        if old.log_retention_days != self.preferences.log_retention_days {
            self.log.prune(self.preferences.log_retention_days);
        }
        if old.show_in_dock != self.preferences.show_in_dock
            || old.show_menu_bar_icon != self.preferences.show_menu_bar_icon
        {
            self.presentation.apply_visibility(
                self.preferences.show_in_dock,
                self.preferences.show_menu_bar_icon,
            );
        }
        if old.stop_on_mouse_movement != self.preferences.stop_on_mouse_movement {
            self.watcher
                .set_armed(self.preferences.stop_on_mouse_movement);
        }

        self.evaluate(reason);
    }

    /// Genuine user movement interrupt. Ignored unless the stop-on-movement
    /// preference is set, simulation is currently on, and the engine is not
    /// itself mid-move.
    pub fn on_real_movement(&mut self) {
        if !self.preferences.stop_on_mouse_movement {
            return;
        }
        if !self.manual_simulate_activity {
            return;
        }
        if self.engine.is_performing_jiggle() {
            return;
        }
        self.manual_simulate_activity = false;
        self.evaluate("User mouse movement detected");
    }

    /// Reconcile manual intent into the authoritative active state, drive
    /// the engine, log the transition exactly once, and persist.
    fn evaluate(&mut self, reason: &str) {
        let active = self.manual_simulate_activity;

        self.engine.set_distance(self.preferences.jiggle_distance);
        self.engine.set_interval(self.preferences.jiggle_interval);
        self.engine.set_jiggling(active);

        self.is_active = active;

        if self.last_active != active {
            let action = if active {
                "Jiggler Enabled"
            } else {
                "Jiggler Disabled"
            };
            self.log.append(LogEntry::new(action, reason));
            if self.preferences.notify_on_start_stop {
                let body = if active {
                    "Jiggler enabled."
                } else {
                    "Jiggler disabled."
                };
                self.notifier.notify(NOTIFICATION_TITLE, body);
            }
        }
        self.last_active = active;

        self.persist();
    }

    fn persist(&self) {
        self.state.save(&Snapshot {
            preferences: self.preferences.clone(),
            manual_simulate_activity: self.manual_simulate_activity,
        });
    }

    /// Current snapshot of the controller's persisted state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            preferences: self.preferences.clone(),
            manual_simulate_activity: self.manual_simulate_activity,
        }
    }

    pub fn export_logs_text(&self) -> String {
        self.log.export_text()
    }

    pub fn clear_logs(&mut self) {
        self.log.clear();
    }

    pub fn log_entries(&self) -> &std::collections::VecDeque<LogEntry> {
        self.log.entries()
    }
}
