//! Serialized command dispatch
//!
//! One long-lived thread pops the queue. Each command runs on its own
//! worker thread, and the dispatcher joins that worker before popping the
//! next item, so commands reach the application strictly in queue order.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::command::executor::CommandExecutor;
use crate::command::status::compose_result;
use crate::core::error::PilotError;
use crate::core::types::CommandRequest;
use crate::session::events::{EventSink, UiEvent};
use crate::session::queue::CommandQueue;

/// Marks a popped item done when dropped, whatever happened to it
struct TaskDone<'a>(&'a CommandQueue);

impl Drop for TaskDone<'_> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

/// The dispatch loop and its collaborators
pub struct Dispatcher {
    queue: Arc<CommandQueue>,
    executor: Arc<dyn CommandExecutor>,
    events: EventSink,
}

impl Dispatcher {
    pub fn new(queue: Arc<CommandQueue>, executor: Arc<dyn CommandExecutor>, events: EventSink) -> Self {
        Self {
            queue,
            executor,
            events,
        }
    }

    /// Start the dispatch thread
    pub fn spawn(self) -> std::io::Result<DispatcherHandle> {
        let queue = Arc::clone(&self.queue);
        let thread = thread::Builder::new()
            .name("dispatcher".into())
            .spawn(move || self.run())?;
        Ok(DispatcherHandle {
            queue,
            thread: Some(thread),
        })
    }

    fn run(self) {
        tracing::debug!("Dispatcher started");
        while let Some(request) = self.queue.pop() {
            let _done = TaskDone(&self.queue);
            self.dispatch(request);
        }
        tracing::debug!("Dispatcher stopped");
    }

    /// Run one request on a worker and wait for it
    fn dispatch(&self, request: CommandRequest) {
        let id = request.id;
        let command = request.name;
        tracing::info!("Dispatching {} ({})", command, id);

        let executor = Arc::clone(&self.executor);
        let events = self.events.clone();
        let worker = thread::Builder::new()
            .name(format!("cmd-{}", command))
            .spawn(move || {
                let outcome = executor.execute(request.name, &request.args);
                let result = compose_result(request.id, request.name, outcome);
                if result.success {
                    tracing::info!("{} ({}) finished", request.name, request.id);
                } else {
                    tracing::warn!("{} ({}) failed: {}", request.name, request.id, result.response_text);
                }
                events.post(UiEvent::Executed(result));
            });

        let failure = match worker {
            Ok(handle) => match handle.join() {
                Ok(()) => return,
                Err(_) => PilotError::Executor("worker panicked".into()),
            },
            Err(e) => PilotError::Io(e),
        };

        tracing::error!("{} ({}) did not complete: {}", command, id, failure);
        self.events
            .post(UiEvent::Executed(compose_result(id, command, Err(failure))));
    }
}

/// Owner's handle on the dispatch thread
///
/// Stopping halts dispatch before the next pop; a command already running
/// finishes first. Dropping the handle stops it.
pub struct DispatcherHandle {
    queue: Arc<CommandQueue>,
    thread: Option<JoinHandle<()>>,
}

impl DispatcherHandle {
    pub fn stop(&mut self) {
        self.queue.stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Dispatcher thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
