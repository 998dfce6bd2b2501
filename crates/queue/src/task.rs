use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A unit of work the lane can execute.
///
/// Closures get this for free. Implement it directly when the work is
/// a struct carrying its own inputs.
pub trait Work: Send + 'static {
    /// Run the work to completion on the lane thread.
    fn execute(self: Box<Self>);
}

impl<F> Work for F
where
    F: FnOnce() + Send + 'static,
{
    fn execute(self: Box<Self>) {
        (*self)()
    }
}

/// Log label for an optional task name.
pub(crate) fn display_name(name: Option<&str>) -> &str {
    name.unwrap_or("<unnamed>")
}

/// A queued task. Created on submission, consumed by the lane.
pub(crate) struct Task {
    pub(crate) id: Uuid,
    pub(crate) name: Option<String>,
    pub(crate) wait_for_signal: bool,
    pub(crate) work: Box<dyn Work>,
}

impl Task {
    pub(crate) fn new(name: Option<String>, wait_for_signal: bool, work: Box<dyn Work>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            wait_for_signal,
            work,
        }
    }

    /// Label for log lines.
    pub(crate) fn display_name(&self) -> &str {
        display_name(self.name.as_deref())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("wait_for_signal", &self.wait_for_signal)
            .finish_non_exhaustive()
    }
}

/// The task currently held by the lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentTask {
    pub id: Uuid,
    pub name: Option<String>,
    pub wait_for_signal: bool,
    /// When the lane popped it off the pending queue.
    pub started_at: DateTime<Utc>,
}

impl CurrentTask {
    pub(crate) fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            wait_for_signal: task.wait_for_signal,
            started_at: Utc::now(),
        }
    }
}
