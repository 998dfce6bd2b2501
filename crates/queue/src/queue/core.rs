use std::fmt;
use std::sync::Arc;
use std::thread::ThreadId;

use tracing::{debug, info};

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::lane::ExecutionLane;
use crate::metrics::QueueMetrics;
use crate::serializer::{AccessSerializer, LaneState};
use crate::task::CurrentTask;

/// A serial compute queue with one execution lane.
///
/// Cloning is cheap and every clone talks to the same lane, so work items
/// can capture a clone to submit follow-up work or release themselves with
/// [`signal_proceed`](ComputeQueue::signal_proceed). When the last clone is
/// dropped the lane finishes whatever is still queued and its thread exits.
/// A task left waiting for a signal at that point can never be released, so
/// the lane gives up on it and drops the tasks behind it without running them.
#[derive(Clone)]
pub struct ComputeQueue {
    pub(super) inner: Arc<QueueHandle>,
}

pub(super) struct QueueHandle {
    pub(super) label: String,
    pub(super) serializer: Arc<AccessSerializer>,
    pub(super) lane_thread: ThreadId,
}

impl Drop for QueueHandle {
    fn drop(&mut self) {
        debug!("Last handle to {} dropped, shutting lane down", self.label);
        self.serializer.request_shutdown();
    }
}

impl ComputeQueue {
    /// Create a queue whose lane thread is named `label`.
    pub fn new(label: impl Into<String>) -> Result<Self, QueueError> {
        Self::with_config(QueueConfig::with_label(label))
    }

    /// Create a queue from a full config.
    pub fn with_config(config: QueueConfig) -> Result<Self, QueueError> {
        config.validate()?;

        let serializer = Arc::new(AccessSerializer::new());
        let lane = ExecutionLane::new(config.label.clone(), Arc::clone(&serializer));
        let handle = lane
            .spawn(config.stack_size)
            .map_err(|source| QueueError::Spawn {
                label: config.label.clone(),
                source,
            })?;
        // Detached: the lane exits on its own once shut down and drained.
        let lane_thread = handle.thread().id();

        info!("Compute queue {} created", config.label);
        Ok(Self {
            inner: Arc::new(QueueHandle {
                label: config.label,
                serializer,
                lane_thread,
            }),
        })
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Current lane state.
    pub fn lane_state(&self) -> LaneState {
        self.inner.serializer.with(|state| state.lane)
    }

    /// Whether a drain is in progress (including a task waiting for a signal).
    pub fn is_draining(&self) -> bool {
        self.lane_state() != LaneState::Idle
    }

    /// Number of queued tasks, not counting the one executing.
    pub fn pending_len(&self) -> usize {
        self.inner.serializer.with(|state| state.pending.len())
    }

    /// Number of distinct task names outstanding.
    pub fn outstanding_names(&self) -> usize {
        self.inner.serializer.with(|state| state.names.len())
    }

    /// The task the lane currently holds, if any.
    pub fn current_task(&self) -> Option<CurrentTask> {
        self.inner.serializer.with(|state| state.current.clone())
    }

    /// Get a snapshot of the queue metrics.
    pub fn metrics(&self) -> QueueMetrics {
        self.inner.serializer.with(|state| state.metrics.clone())
    }
}

impl fmt::Debug for ComputeQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeQueue")
            .field("label", &self.inner.label)
            .field("lane_state", &self.lane_state())
            .field("pending", &self.pending_len())
            .finish()
    }
}
