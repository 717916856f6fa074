// src/core/busy.rs

//! Nested in-flight counter shared by every serialized queue, plus the idle gate
//! that `await_idle` blocks on.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct GateState {
    in_flight: usize,
    /// Bumped on every 1 -> 0 transition. A waiter that saw epoch `n` is released
    /// as soon as the epoch moves past `n`, even if new work re-armed the gate
    /// before the waiter got scheduled.
    idle_epoch: u64,
    /// Bumped on every 0 -> 1 transition.
    busy_epoch: u64,
}

/// Process-wide busy counter with an auto-resetting idle latch.
#[derive(Debug, Default)]
pub struct BusyGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        // Plain counters; a panic while holding the lock cannot leave them torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks one more operation as in flight. Arms the gate on 0 -> 1.
    pub fn enter(&self) {
        let mut state = self.lock();
        state.in_flight += 1;
        if state.in_flight == 1 {
            state.busy_epoch = state.busy_epoch.wrapping_add(1);
            log::trace!("Busy gate armed (epoch {}).", state.busy_epoch);
            self.changed.notify_all();
        }
    }

    /// Marks one operation as finished. Releases the gate on 1 -> 0.
    pub fn exit(&self) {
        let mut state = self.lock();
        match state.in_flight {
            0 => {
                log::error!("Busy gate exit without a matching enter; counter stays at 0.");
                debug_assert!(false, "unbalanced BusyGate::exit");
            }
            1 => {
                state.in_flight = 0;
                state.idle_epoch = state.idle_epoch.wrapping_add(1);
                log::trace!("Busy gate released (epoch {}).", state.idle_epoch);
                self.changed.notify_all();
            }
            _ => state.in_flight -= 1,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// Blocks until no operation is in flight or `timeout` elapses.
    /// Returns `true` when idle was reached. A timeout does not stop anything.
    pub fn await_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        let start_epoch = state.idle_epoch;
        loop {
            if state.in_flight == 0 || state.idle_epoch != start_epoch {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            state = match self.changed.wait_timeout(state, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Blocks until something is in flight or `timeout` elapses. Used by the
    /// busy indicator to sleep while idle.
    pub fn await_busy(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        let start_epoch = state.busy_epoch;
        loop {
            if state.in_flight > 0 || state.busy_epoch != start_epoch {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            state = match self.changed.wait_timeout(state, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}
