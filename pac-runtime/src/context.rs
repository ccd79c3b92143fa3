use std::collections::VecDeque;
use std::thread::ThreadId;

use crate::runnable::AnyRunnable;

/// A FIFO of runnables belonging to one thread.
///
/// `Context` is a plain state machine: it knows nothing about mutexes,
/// condition variables or threads. Guarding concurrent access to it is the
/// job of whichever [`crate::toe::Toe`] owns it.
#[derive(Default)]
pub struct Context {
    queue: VecDeque<Box<dyn AnyRunnable>>,
    owning_thread_id: Option<ThreadId>,
}

impl Context {
    /// An empty context with no owning thread yet.
    #[must_use]
    pub fn new() -> Self {
        Context::default()
    }

    /// Pushes a runnable onto the tail of the queue.
    pub fn push(&mut self, runnable: Box<dyn AnyRunnable>) {
        self.queue.push_back(runnable);
    }

    /// Pops the runnable at the head of the queue, if any.
    pub fn pop_front(&mut self) -> Option<Box<dyn AnyRunnable>> {
        self.queue.pop_front()
    }

    /// The number of runnables currently queued.
    #[must_use]
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    /// Drops every queued runnable without running it.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// The thread id recorded as owning this context, if it has been claimed.
    #[must_use]
    pub fn owning_thread_id(&self) -> Option<ThreadId> {
        self.owning_thread_id
    }

    /// Records `id` as the thread that owns this context.
    pub fn set_owning_thread_id(&mut self, id: ThreadId) {
        self.owning_thread_id = Some(id);
    }
}
