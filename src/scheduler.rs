//! Cooperative tick scheduler.
//!
//! Holds the node's periodic duties and decides readiness with
//! wraparound-safe time arithmetic. The scheduler notifies a
//! [`TaskRunner`] when entries come due; the main loop implements the
//! runner to dispatch into the duty modules.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Control loop                        │
//! │                                                          │
//! │   ensure link ─▶ ensure session ─▶ drain inbound         │
//! │                        │                                 │
//! │                        ▼                                 │
//! │            TickScheduler::tick(now, runner)              │
//! │                        │                                 │
//! │        ┌───────────────┼────────────────┐                │
//! │        ▼               ▼                ▼                │
//! │   fire alarm      reporter         heartbeat             │
//! │   (priority 0)    (priority 1)     (priority 2)          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no preemption and no timer interrupt: readiness is evaluated in
//! fixed registration order on every tick, so within one iteration later
//! duties observe whatever state earlier duties left behind.

use crate::clock::ticks_diff;
use log::warn;

/// Maximum number of registered duties (stack-allocated table).
const MAX_TASKS: usize = 8;

/// Callback trait the scheduler invokes for each due entry.
///
/// This decouples the scheduler from the duty modules: the scheduler knows
/// ids and periods, nothing else, which keeps it independently testable.
/// A returned error is logged here — the designated task boundary — and the
/// entry is not retried until its own next period.
pub trait TaskRunner<Id> {
    fn run_task(&mut self, id: Id) -> crate::error::Result<()>;
}

/// Internal bookkeeping for one registered duty.
#[derive(Debug, Clone)]
struct TaskEntry<Id> {
    id: Id,
    /// Human-readable label (e.g. "fire-alarm").
    label: &'static str,
    period_ms: u32,
    /// Wrapping-ms timestamp of the last invocation attempt, success or
    /// failure. Updating it unconditionally rate-limits error retries to
    /// one per period.
    last_run: u32,
}

/// The tick scheduler engine.
pub struct TickScheduler<Id> {
    entries: heapless::Vec<TaskEntry<Id>, MAX_TASKS>,
}

impl<Id: Copy + PartialEq + core::fmt::Debug> TickScheduler<Id> {
    pub fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
        }
    }

    /// Register a duty. Entries fire in registration order, which is the
    /// node's fixed priority order. Returns the slot index, or `None` if
    /// the table is full.
    pub fn register(&mut self, id: Id, label: &'static str, period_ms: u32) -> Option<usize> {
        let entry = TaskEntry {
            id,
            label,
            period_ms,
            last_run: 0,
        };
        match self.entries.push(entry) {
            Ok(()) => Some(self.entries.len() - 1),
            Err(_) => {
                warn!("scheduler: task table full, '{label}' not registered");
                None
            }
        }
    }

    /// Update a duty's period. Applies from the next readiness check, so a
    /// config change takes effect without restarting the scheduler.
    pub fn set_period(&mut self, id: Id, period_ms: u32) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.id == id) {
            e.period_ms = period_ms;
        }
    }

    /// Current period of a duty, if registered.
    pub fn period(&self, id: Id) -> Option<u32> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.period_ms)
    }

    /// Evaluate every entry in registration order, invoking each whose
    /// period has elapsed at `now` on the wrapping clock.
    ///
    /// `last_run` moves to `now` exactly once per firing, before the duty
    /// runs, so a failing duty is not retried until its own next period.
    pub fn tick(&mut self, now: u32, runner: &mut dyn TaskRunner<Id>) {
        for entry in &mut self.entries {
            if ticks_diff(now, entry.last_run) >= entry.period_ms as i32 {
                entry.last_run = now;
                if let Err(e) = runner.run_task(entry.id) {
                    warn!("task '{}' failed: {e}", entry.label);
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
