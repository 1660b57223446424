//! Delayed callbacks on a host-driven clock
//!
//! The clock only moves when the host calls [`TimerQueue::advance`], which
//! keeps animation timing deterministic and lets hosts map it onto whatever
//! time source they render with.

use std::cell::{Cell, RefCell};
use std::fmt;

use slotmap::{new_key_type, SlotMap};

use crate::error::{CoreError, Result};

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

struct Timer {
    due_ms: u64,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

/// Queue of one-shot timers
#[derive(Default)]
pub struct TimerQueue {
    now_ms: Cell<u64>,
    next_seq: Cell<u64>,
    timers: RefCell<SlotMap<TimerId, Timer>>,
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now_ms", &self.now_ms.get())
            .field("pending", &self.pending())
            .finish()
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Run `callback` once `delay_ms` has elapsed
    pub fn schedule<F>(&self, delay_ms: u64, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().insert(Timer {
            due_ms: self.now_ms.get() + delay_ms,
            seq,
            callback: Box::new(callback),
        })
    }

    /// Cancel a pending timer
    pub fn cancel(&self, id: TimerId) -> Result<()> {
        self.timers
            .borrow_mut()
            .remove(id)
            .map(|_| ())
            .ok_or(CoreError::UnknownTimer(id))
    }

    /// Move the clock forward, firing due timers in due order
    ///
    /// Timers scheduled by a firing callback run in the same call when they
    /// fall due before the new clock value. Returns the number fired.
    pub fn advance(&self, delta_ms: u64) -> usize {
        let target = self.now_ms.get() + delta_ms;
        let mut fired = 0;

        loop {
            let next = self
                .timers
                .borrow()
                .iter()
                .filter(|(_, t)| t.due_ms <= target)
                .min_by_key(|(_, t)| (t.due_ms, t.seq))
                .map(|(id, t)| (id, t.due_ms));

            let Some((id, due_ms)) = next else {
                break;
            };
            let Some(timer) = self.timers.borrow_mut().remove(id) else {
                break;
            };
            self.now_ms.set(due_ms);
            (timer.callback)();
            fired += 1;
        }

        self.now_ms.set(target);
        fired
    }
}
