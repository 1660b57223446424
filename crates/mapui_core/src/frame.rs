//! Next-frame task queue
//!
//! Hosts drain the queue once per rendered frame, after their own redraw.
//! Enqueuing is idempotent per [`FrameKey`]: a second request for the same
//! key before the frame runs is dropped, so bursts of viewport events collapse
//! into one task per frame.

use std::cell::{Cell, RefCell};
use std::fmt;

use rustc_hash::FxHashSet;

/// Identifies a coalescible frame task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameKey {
    /// Task family, e.g. `"reposition"`
    pub scope: &'static str,
    /// Instance within the family
    pub id: u64,
}

impl FrameKey {
    pub const fn new(scope: &'static str, id: u64) -> Self {
        Self { scope, id }
    }
}

type FrameTask = Box<dyn FnOnce()>;

/// Queue of tasks to run on the next frame
#[derive(Default)]
pub struct FrameQueue {
    tasks: RefCell<Vec<(FrameKey, FrameTask)>>,
    queued: RefCell<FxHashSet<FrameKey>>,
    frames: Cell<u64>,
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending())
            .field("frames", &self.frames.get())
            .finish()
    }
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next frame
    ///
    /// Returns false (and drops `task`) when a task with the same key is
    /// already waiting.
    pub fn enqueue<F>(&self, key: FrameKey, task: F) -> bool
    where
        F: FnOnce() + 'static,
    {
        if !self.queued.borrow_mut().insert(key) {
            return false;
        }
        self.tasks.borrow_mut().push((key, Box::new(task)));
        true
    }

    /// Check whether a task for `key` is waiting
    pub fn is_queued(&self, key: FrameKey) -> bool {
        self.queued.borrow().contains(&key)
    }

    /// Number of waiting tasks
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Number of frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frames.get()
    }

    /// Run every task queued before this call, in enqueue order
    ///
    /// Tasks queued while the frame runs wait for the next frame.
    /// Returns the number of tasks run.
    pub fn run_frame(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        self.queued.borrow_mut().clear();
        self.frames.set(self.frames.get() + 1);

        let count = tasks.len();
        for (key, task) in tasks {
            tracing::trace!(scope = key.scope, id = key.id, "running frame task");
            task();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_enqueue_is_idempotent_per_key() {
        let queue = FrameQueue::new();
        let runs = Rc::new(Cell::new(0));

        for _ in 0..5 {
            let runs = Rc::clone(&runs);
            queue.enqueue(FrameKey::new("reposition", 1), move || {
                runs.set(runs.get() + 1)
            });
        }
        let other = Rc::clone(&runs);
        assert!(queue.enqueue(FrameKey::new("reposition", 2), move || {
            other.set(other.get() + 10)
        }));

        assert_eq!(queue.pending(), 2);
        assert_eq!(queue.run_frame(), 2);
        assert_eq!(runs.get(), 11);
        assert_eq!(queue.frame_count(), 1);
    }

    #[test]
    fn test_tasks_queued_during_frame_wait() {
        let queue = Rc::new(FrameQueue::new());
        let inner = Rc::clone(&queue);
        queue.enqueue(FrameKey::new("outer", 0), move || {
            inner.enqueue(FrameKey::new("outer", 0), || {});
        });

        assert_eq!(queue.run_frame(), 1);
        assert!(queue.is_queued(FrameKey::new("outer", 0)));
        assert_eq!(queue.run_frame(), 1);
        assert_eq!(queue.pending(), 0);
    }
}
