//! Thread-safe FIFO command queue with completion accounting
//!
//! Producers `push`, the dispatcher `pop`s and later calls `task_done`
//! once per popped item. `wait_idle` blocks until every pushed item has
//! been marked done. All synchronization is internal.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::core::error::{PilotError, Result};
use crate::core::types::CommandRequest;

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<CommandRequest>,
    /// Pushed but not yet marked done
    unfinished: usize,
    stopped: bool,
}

/// FIFO of validated commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    idle: Condvar,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Every update is a single step, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a request; fails once the queue has been stopped
    pub fn push(&self, request: CommandRequest) -> Result<()> {
        let mut state = self.lock();
        if state.stopped {
            return Err(PilotError::QueueClosed);
        }
        tracing::info!("Enqueued {} ({})", request.name, request.id);
        state.items.push_back(request);
        state.unfinished += 1;
        self.available.notify_one();
        Ok(())
    }

    /// Block until an item is available; `None` once stopped
    pub fn pop(&self) -> Option<CommandRequest> {
        let mut state = self.lock();
        loop {
            if state.stopped {
                return None;
            }
            if let Some(request) = state.items.pop_front() {
                return Some(request);
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Mark one popped item as finished
    pub fn task_done(&self) {
        let mut state = self.lock();
        state.unfinished = state.unfinished.saturating_sub(1);
        if state.unfinished == 0 {
            self.idle.notify_all();
        }
    }

    /// Block until every pushed item has been marked done
    pub fn wait_idle(&self) {
        let mut state = self.lock();
        while state.unfinished > 0 {
            state = self
                .idle
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Stop handing out items
    ///
    /// Items still queued are discarded and count as done, so `wait_idle`
    /// returns once any in-flight item finishes.
    pub fn stop(&self) {
        let mut state = self.lock();
        state.stopped = true;
        let dropped = state.items.len();
        state.items.clear();
        state.unfinished = state.unfinished.saturating_sub(dropped);
        if dropped > 0 {
            tracing::warn!("Queue stopped, {} pending command(s) discarded", dropped);
        }
        if state.unfinished == 0 {
            self.idle.notify_all();
        }
        self.available.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Items waiting to be popped
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
