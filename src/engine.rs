//! Timer-driven jiggle engine.
//!
//! A two-state machine (Idle / Jiggling). Entering Jiggling performs one
//! simulated move immediately and then repeats every `interval` seconds on
//! a dedicated timer thread; leaving Jiggling cancels the thread
//! synchronously. `set_jiggling` with an unchanged value is a strict no-op,
//! so repeated evaluations never restart the timer.

use crate::config::{DEFAULT_JIGGLE_DISTANCE, DEFAULT_JIGGLE_INTERVAL_SECS};
use crate::platform::{Point, PointerDevice};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Pause between the outbound move and the return move, so the jiggle is
/// visible to the human eye.
const VISIBILITY_DELAY: Duration = Duration::from_millis(200);
/// Grace period after the return move for the posted event to propagate
/// before the in-flight flag clears.
const GRACE_DELAY: Duration = Duration::from_millis(100);
/// Granularity at which the timer thread checks for cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Bounds on the armed timer interval. Values outside are clamped so the
/// float-to-duration conversion can never overflow.
const MIN_TIMER_INTERVAL_SECS: f64 = 0.1;
const MAX_TIMER_INTERVAL_SECS: f64 = 86_400.0;

pub struct JiggleEngine {
    pointer: Arc<dyn PointerDevice>,
    /// Read at each move, so a changed distance applies on the next tick.
    distance: Arc<Mutex<f64>>,
    /// Captured when the timer is armed; a changed interval applies on the
    /// next stop/start cycle, never retroactively.
    interval_secs: f64,
    jiggling: bool,
    performing: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    timer: Option<JoinHandle<()>>,
}

impl JiggleEngine {
    pub fn new(pointer: Arc<dyn PointerDevice>) -> Self {
        Self {
            pointer,
            distance: Arc::new(Mutex::new(DEFAULT_JIGGLE_DISTANCE)),
            interval_secs: DEFAULT_JIGGLE_INTERVAL_SECS,
            jiggling: false,
            performing: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            timer: None,
        }
    }

    pub fn set_distance(&self, distance: f64) {
        if let Ok(mut slot) = self.distance.lock() {
            *slot = distance;
        }
    }

    /// Non-finite or non-positive values are ignored; the previous interval
    /// stays in effect.
    pub fn set_interval(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.interval_secs = secs;
        }
    }

    pub fn is_jiggling(&self) -> bool {
        self.jiggling
    }

    /// True while a synthetic move pair is in flight. This is how movement
    /// watchers distinguish self-caused movement from genuine user movement,
    /// since both arrive as the same low-level event.
    pub fn is_performing_jiggle(&self) -> bool {
        self.performing.load(Ordering::SeqCst)
    }

    /// Drive the Idle/Jiggling transition. Idempotent: an unchanged value
    /// neither restarts the timer nor performs an extra immediate move.
    pub fn set_jiggling(&mut self, jiggling: bool) {
        if self.jiggling == jiggling {
            return;
        }
        self.jiggling = jiggling;
        if jiggling {
            self.start_timer();
        } else {
            self.stop_timer();
        }
    }

    fn start_timer(&mut self) {
        // No duplicate timers.
        self.stop_timer();

        tracing::debug!(
            "starting jiggle timer (interval: {}s)",
            self.interval_secs
        );

        // Fresh liveness flag per arm, so a late-exiting old thread can
        // never observe the new timer's flag.
        self.running = Arc::new(AtomicBool::new(true));
        let running = self.running.clone();
        let performing = self.performing.clone();
        let pointer = self.pointer.clone();
        let distance = self.distance.clone();
        let interval = Duration::from_secs_f64(
            self.interval_secs
                .clamp(MIN_TIMER_INTERVAL_SECS, MAX_TIMER_INTERVAL_SECS),
        );

        self.timer = Some(thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let current_distance = distance
                    .lock()
                    .map(|d| *d)
                    .unwrap_or(DEFAULT_JIGGLE_DISTANCE);
                perform_move(pointer.as_ref(), &performing, current_distance);

                let mut waited = Duration::ZERO;
                while waited < interval && running.load(Ordering::SeqCst) {
                    let slice = CANCEL_POLL.min(interval - waited);
                    thread::sleep(slice);
                    waited += slice;
                }
            }
        }));
    }

    fn stop_timer(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.timer.take() {
            tracing::debug!("stopping jiggle timer");
            let _ = handle.join();
        }
    }
}

impl Drop for JiggleEngine {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

/// Perform one simulated move: out by `distance` pixels along the x axis,
/// pause, and back to the origin.
///
/// If the current pointer position cannot be read the move is skipped
/// silently; the next timer tick retries naturally.
fn perform_move(pointer: &dyn PointerDevice, performing: &AtomicBool, distance: f64) {
    let origin = match pointer.current_position() {
        Some(origin) => origin,
        None => {
            tracing::debug!("pointer position unavailable, skipping move");
            return;
        }
    };

    performing.store(true, Ordering::SeqCst);

    pointer.post_move(Point {
        x: origin.x + distance,
        y: origin.y,
    });
    thread::sleep(VISIBILITY_DELAY);
    pointer.post_move(origin);
    thread::sleep(GRACE_DELAY);

    performing.store(false, Ordering::SeqCst);
}
