//! The execution lane: a single thread that drains the pending queue in order.
//!
//! State machine: Idle -> Draining -> Idle, with a nested Waiting state while
//! a task that asked for a signal sits between finishing its work and
//! releasing its name. A panic in a task's work unwinds the lane thread and
//! nothing further runs on that queue.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::serializer::AccessSerializer;
use crate::task::{display_name, Task};

pub(crate) struct ExecutionLane {
    label: String,
    serializer: Arc<AccessSerializer>,
}

impl ExecutionLane {
    pub(crate) fn new(label: String, serializer: Arc<AccessSerializer>) -> Self {
        Self { label, serializer }
    }

    /// Start the lane on its own named thread.
    pub(crate) fn spawn(self, stack_size: Option<usize>) -> std::io::Result<JoinHandle<()>> {
        let mut builder = thread::Builder::new().name(self.label.clone());
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }
        builder.spawn(move || self.run())
    }

    fn run(self) {
        info!("Lane {} started", self.label);
        while let Some(task) = self.serializer.next_task() {
            if !self.run_task(task) {
                let abandoned = self.serializer.abandon();
                warn!(
                    "Lane {} shut down while waiting for a signal, {} queued task(s) not run",
                    self.label,
                    abandoned.len()
                );
                break;
            }
        }
        info!("Lane {} stopped", self.label);
    }

    /// Returns `false` if the task was left waiting for a signal that can
    /// no longer arrive.
    fn run_task(&self, task: Task) -> bool {
        debug!("Lane {} running {} ({})", self.label, task.display_name(), task.id);
        let Task {
            id,
            name,
            wait_for_signal,
            work,
        } = task;

        let started = Instant::now();
        {
            let _report = PanicReport {
                label: &self.label,
                id,
                name: name.as_deref(),
            };
            work.execute();
        }
        let elapsed = started.elapsed();

        if wait_for_signal {
            debug!("Lane {} waiting for signal ({})", self.label, id);
            if !self.serializer.await_signal() {
                return false;
            }
            debug!("Lane {} resumed ({})", self.label, id);
        }

        self.serializer.finish(name.as_deref(), elapsed);
        true
    }
}

/// Logs a task panic while the lane unwinds.
struct PanicReport<'a> {
    label: &'a str,
    id: Uuid,
    name: Option<&'a str>,
}

impl Drop for PanicReport<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(
                "Task {} ({}) panicked, lane {} is dead",
                display_name(self.name),
                self.id,
                self.label
            );
        }
    }
}
