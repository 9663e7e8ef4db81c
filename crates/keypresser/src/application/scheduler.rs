//! Scheduling Engine: runs the enabled emitters while the state is Running.
//!
//! # Task model
//!
//! Each emitter is one tokio task.  A tick does its blocking work (window
//! raise, serial writes, the press-hold sleep) on the blocking pool, so a slow
//! tick never delays another emitter's timer.
//!
//! - **Independent** mode: every enabled slot and the space emitter fire once
//!   at start, then sleep a fresh random interval from their own range after
//!   each tick.
//! - **Sequential** mode: one task walks the enabled slots in ascending order.
//!   The wait before each press is drawn from the range of the slot about to
//!   fire; the first wait uses the first slot's range.  No space emitter.
//!
//! # Cancellation
//!
//! The run state lives behind an `RwLock` together with a generation number.
//! A tick holds the read lock from its generation check until its last write.
//! `stop` takes the write lock to flip the state, which waits for in-flight
//! ticks; any tick after that sees a stale generation and does no I/O.  So
//! once `stop` returns, nothing is written to the transport.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keypresser_core::{
    EmitterConfig, EmitterTable, IntervalRange, KeyStroke, RunState, SequenceCursor, TriggerMode,
};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::input_driver::{InputDriver, DEFAULT_PRESS_DURATION};
use crate::infrastructure::window_binder::{InputAttachment, WindowBinder};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Start was requested with no target window bound.
    #[error("no target window is bound")]
    NoTargetWindow,

    /// The run-state update did not complete.
    #[error("run state update failed: {0}")]
    StateUpdate(String),
}

/// Settings that shape a run.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub mode: TriggerMode,
    pub keep_topmost: bool,
    /// Hold time between press and release of a single key.
    pub press_duration: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            mode: TriggerMode::Independent,
            keep_topmost: false,
            press_duration: DEFAULT_PRESS_DURATION,
        }
    }
}

/// Which emitter a task drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmitterId {
    Slot(usize),
    Space,
}

struct Shared {
    driver: Arc<InputDriver>,
    binder: Arc<dyn WindowBinder>,
    gate: RwLock<RunState>,
    table: RwLock<EmitterTable>,
    mode: RwLock<TriggerMode>,
    keep_topmost: AtomicBool,
    press_duration: Duration,
    generation: AtomicU64,
    attached: Mutex<Option<InputAttachment>>,
}

/// Start/stop state machine plus the emitter tasks it owns.
pub struct Scheduler {
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(
        driver: Arc<InputDriver>,
        binder: Arc<dyn WindowBinder>,
        table: EmitterTable,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                driver,
                binder,
                gate: RwLock::new(RunState::Stopped),
                table: RwLock::new(table),
                mode: RwLock::new(config.mode),
                keep_topmost: AtomicBool::new(config.keep_topmost),
                press_duration: config.press_duration,
                generation: AtomicU64::new(0),
                attached: Mutex::new(None),
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    // ── Queries and settings ──────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.shared.gate.read().is_running()
    }

    pub fn state(&self) -> RunState {
        *self.shared.gate.read()
    }

    pub fn has_target_window(&self) -> bool {
        self.shared.binder.bound_window().is_some()
    }

    /// Mode for the next start; a running scheduler keeps its current mode.
    pub fn set_mode(&self, mode: TriggerMode) {
        *self.shared.mode.write() = mode;
    }

    /// Replaces the emitter table.  Running ticks pick up new keys and
    /// intervals; the set of armed emitters changes on the next start.
    pub fn update_table(&self, table: EmitterTable) {
        *self.shared.table.write() = table;
    }

    /// Turns the keep-topmost policy on or off.
    ///
    /// Turning it off releases the bound window from topmost placement right
    /// away instead of waiting for a tick.
    pub fn set_keep_topmost(&self, keep: bool) {
        self.shared.keep_topmost.store(keep, Ordering::SeqCst);
        if !keep {
            if let Some(hwnd) = self.shared.binder.bound_window() {
                self.shared.binder.set_topmost(hwnd, false);
            }
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    /// Stopped → Running.  Calling it while running tears the current run
    /// down the way [`Scheduler::stop`] does, then starts from scratch.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NoTargetWindow`] with no state change when no
    /// window is bound; [`SchedulerError::StateUpdate`] if the state could
    /// not be switched.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let hwnd = self
            .shared
            .binder
            .bound_window()
            .ok_or(SchedulerError::NoTargetWindow)?;

        let mode = *self.shared.mode.read();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let was_running = update_gate(&self.shared, move |gate| {
            let was = gate.is_running();
            *gate = RunState::Running { mode, generation };
            was
        })
        .await?;
        self.release(was_running);

        let table = self.shared.table.read().clone();
        let mut tasks = Vec::new();
        match mode {
            TriggerMode::Independent => {
                *self.shared.attached.lock() = self.shared.binder.attach_input(hwnd);

                if table.space.enabled {
                    tasks.push(tokio::spawn(run_independent(
                        Arc::clone(&self.shared),
                        generation,
                        EmitterId::Space,
                    )));
                }
                for (index, _) in table.enabled_slots() {
                    tasks.push(tokio::spawn(run_independent(
                        Arc::clone(&self.shared),
                        generation,
                        EmitterId::Slot(index),
                    )));
                }
            }
            TriggerMode::Sequential => {
                let order = table.enabled_slots().iter().map(|(i, _)| *i).collect();
                tasks.push(tokio::spawn(run_sequential(
                    Arc::clone(&self.shared),
                    generation,
                    SequenceCursor::new(order),
                )));
            }
        }

        info!(%mode, emitters = tasks.len(), restart = was_running, "scheduler started");
        self.tasks.lock().extend(tasks);
        Ok(())
    }

    /// Running → Stopped.  Idempotent.
    ///
    /// Waits for in-flight ticks, cancels every emitter, drops queued input
    /// aimed at the target window, and detaches input.
    pub async fn stop(&self) {
        let was_running = match update_gate(&self.shared, |gate| {
            let was = gate.is_running();
            *gate = RunState::Stopped;
            was
        })
        .await
        {
            Ok(was) => was,
            Err(_) => {
                *self.shared.gate.write() = RunState::Stopped;
                true
            }
        };
        self.release(was_running);
        if was_running {
            info!("scheduler stopped");
        }
    }

    /// Stops when running, starts otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`Scheduler::start`].
    pub async fn toggle(&self) -> Result<(), SchedulerError> {
        if self.is_running() {
            self.stop().await;
            Ok(())
        } else {
            self.start().await
        }
    }

    fn abort_tasks(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }

    /// Cancels the emitter tasks and undoes the window side effects of the
    /// previous run.  The gate must already be past that run's generation.
    fn release(&self, was_running: bool) {
        self.abort_tasks();
        if was_running {
            if let Some(hwnd) = self.shared.binder.bound_window() {
                self.shared.binder.flush_queued_input(hwnd);
            }
        }
        let attachment = self.shared.attached.lock().take();
        if let Some(attachment) = attachment {
            self.shared.binder.detach_input(attachment);
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let was_running = std::mem::replace(&mut *self.shared.gate.write(), RunState::Stopped)
            .is_running();
        self.release(was_running);
    }
}

/// Applies `update` to the run state under the write lock.
///
/// The lock waits for in-flight ticks, so it is taken on the blocking pool.
async fn update_gate<R, F>(shared: &Arc<Shared>, update: F) -> Result<R, SchedulerError>
where
    F: FnOnce(&mut RunState) -> R + Send + 'static,
    R: Send + 'static,
{
    let shared = Arc::clone(shared);
    tokio::task::spawn_blocking(move || update(&mut shared.gate.write()))
        .await
        .map_err(|e| {
            error!(error = %e, "run state update did not complete");
            SchedulerError::StateUpdate(e.to_string())
        })
}

// ── Emitter tasks ─────────────────────────────────────────────────────────────

impl Shared {
    fn emitter(&self, id: EmitterId) -> Option<EmitterConfig> {
        let table = self.table.read();
        match id {
            EmitterId::Space => Some(table.space.clone()),
            EmitterId::Slot(i) => table.slots.get(i).cloned(),
        }
    }

    fn interval(&self, id: EmitterId) -> IntervalRange {
        self.emitter(id).map(|e| e.interval).unwrap_or_default()
    }

    /// One tick.  Returns `false` when the run it belongs to is over.
    fn fire(&self, generation: u64, id: EmitterId) -> bool {
        let gate = self.gate.read();
        if !gate.is_generation(generation) {
            return false;
        }

        if self.keep_topmost.load(Ordering::SeqCst) {
            if let Some(hwnd) = self.binder.bound_window() {
                self.binder.restore_if_minimized(hwnd);
                self.binder.set_topmost(hwnd, true);
            }
        }

        let Some(emitter) = self.emitter(id) else {
            return true;
        };
        let result = match emitter.keystroke() {
            KeyStroke::Single(code) => self.driver.send_key_code(code, self.press_duration),
            KeyStroke::Combination(codes) => self.driver.press_combination_codes(&codes),
        };
        match result {
            Ok(()) => debug!(?id, key = emitter.key_code, "emitter fired"),
            Err(e) => warn!(?id, error = %e, "emitter tick failed"),
        }
        drop(gate);
        true
    }
}

/// Runs [`Shared::fire`] on the blocking pool.
async fn fire_blocking(shared: &Arc<Shared>, generation: u64, id: EmitterId) -> bool {
    let shared = Arc::clone(shared);
    tokio::task::spawn_blocking(move || shared.fire(generation, id))
        .await
        .unwrap_or(false)
}

async fn run_independent(shared: Arc<Shared>, generation: u64, id: EmitterId) {
    while fire_blocking(&shared, generation, id).await {
        tokio::time::sleep(shared.interval(id).sample()).await;
    }
}

async fn run_sequential(shared: Arc<Shared>, generation: u64, mut cursor: SequenceCursor) {
    let Some(first) = cursor.current() else {
        debug!("sequential mode armed with no enabled slots");
        return;
    };
    tokio::time::sleep(shared.interval(EmitterId::Slot(first)).sample()).await;

    while let Some(slot) = cursor.current() {
        if !fire_blocking(&shared, generation, EmitterId::Slot(slot)).await {
            break;
        }
        cursor.advance();
        let next = cursor.current().unwrap_or(slot);
        tokio::time::sleep(shared.interval(EmitterId::Slot(next)).sample()).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
