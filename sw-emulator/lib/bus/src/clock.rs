/*++

Licensed under the Apache-2.0 license.

File Name:

    clock.rs

Abstract:

    File contains the cycle counter that paces the programmable logic and
    delivers deferred operator events.

--*/
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use crate::Bus;

/// Event delivered to the bus once its cycle comes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerAction {
    /// Deliver [`Bus::poll`]
    Poll,

    /// Deliver [`Bus::warm_reset`] (operator reset button)
    WarmReset,
}

/// A scheduled action. Hand it back to [`Timer::fired`] or [`Timer::cancel`].
#[derive(Debug)]
pub struct ActionHandle {
    due: u64,
    seq: u64,
}

#[derive(Default)]
struct Cycles {
    now: Cell<u64>,
    next_seq: Cell<u64>,

    /// Actions keyed by (due cycle, sequence number)
    pending: RefCell<BTreeMap<(u64, u64), TimerAction>>,
}

/// Cycle counter of the emulated board. One tick per bus access.
#[derive(Default)]
pub struct Clock {
    cycles: Rc<Cycles>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> Timer {
        Timer::new(self)
    }

    /// Cycles elapsed since power-on.
    pub fn now(&self) -> u64 {
        self.cycles.now.get()
    }

    /// Advance by `delta` cycles and deliver whatever came due to `bus`.
    pub fn increment_and_process_timer_actions(&self, delta: u64, bus: &mut impl Bus) {
        let now = self.now().saturating_add(delta);
        self.cycles.now.set(now);

        let due = {
            let mut pending = self.cycles.pending.borrow_mut();
            let later = pending.split_off(&(now.saturating_add(1), 0));
            std::mem::replace(&mut *pending, later)
        };
        // A reset supersedes any completion that fired in the same step.
        if due.values().any(|action| *action == TimerAction::WarmReset) {
            bus.warm_reset();
        } else if !due.is_empty() {
            bus.poll();
        }
    }
}

/// Peripherals that model latency keep a `Timer` to request a later
/// [`Bus::poll`].
#[derive(Clone)]
pub struct Timer {
    cycles: Rc<Cycles>,
}

impl Timer {
    pub fn new(clock: &Clock) -> Self {
        Self {
            cycles: Rc::clone(&clock.cycles),
        }
    }

    /// Returns true and clears `action` once its cycle has passed.
    pub fn fired(&self, action: &mut Option<ActionHandle>) -> bool {
        let now = self.cycles.now.get();
        if action.as_ref().is_some_and(|handle| handle.due <= now) {
            *action = None;
            return true;
        }
        false
    }

    pub fn schedule_poll_in(&self, ticks: u64) -> ActionHandle {
        self.schedule_action_in(ticks, TimerAction::Poll)
    }

    pub fn schedule_action_in(&self, ticks: u64, action: TimerAction) -> ActionHandle {
        let due = self.cycles.now.get().saturating_add(ticks);
        let seq = self.cycles.next_seq.get();
        self.cycles.next_seq.set(seq.wrapping_add(1));
        self.cycles.pending.borrow_mut().insert((due, seq), action);
        ActionHandle { due, seq }
    }

    pub fn cancel(&self, handle: ActionHandle) {
        self.cycles
            .pending
            .borrow_mut()
            .remove(&(handle.due, handle.seq));
    }
}
