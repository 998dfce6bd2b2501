//! The access serializer: one mutex over all queue state.
//!
//! Every read and write of the pending queue, name registry, current task
//! and signal flag happens inside a critical section taken here. Work itself
//! never runs under the lock, so callers only ever block for the length of a
//! metadata update.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tracing::debug;

use crate::metrics::QueueMetrics;
use crate::registry::NameRegistry;
use crate::task::{CurrentTask, Task};

/// Where the lane is in its drain cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LaneState {
    /// Nothing queued, lane parked.
    Idle,
    /// Executing or about to pop the next task.
    Draining,
    /// Current task finished its work and is waiting for `signal_proceed`.
    Waiting,
}

/// Queue state guarded by the serializer.
pub(crate) struct QueueState {
    pub(crate) pending: VecDeque<Task>,
    pub(crate) names: NameRegistry,
    pub(crate) current: Option<CurrentTask>,
    /// Queue-global, not per task. This is only unambiguous because a queue
    /// has exactly one lane, so at most one task can be waiting on it. A
    /// design with several lanes sharing one flag would need to decide who
    /// consumes a signal.
    pub(crate) signal: bool,
    pub(crate) lane: LaneState,
    pub(crate) shutdown: bool,
    pub(crate) metrics: QueueMetrics,
}

impl QueueState {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            names: NameRegistry::default(),
            current: None,
            signal: false,
            lane: LaneState::Idle,
            shutdown: false,
            metrics: QueueMetrics::default(),
        }
    }

    fn is_idle(&self) -> bool {
        self.lane == LaneState::Idle && self.pending.is_empty()
    }
}

pub(crate) struct AccessSerializer {
    state: Mutex<QueueState>,
    /// Wakes the lane for new work or shutdown.
    work_ready: Condvar,
    /// Wakes a waiting task when the signal flag is set.
    signalled: Condvar,
    /// Wakes `wait_idle` callers when a drain completes.
    idle: Condvar,
}

impl AccessSerializer {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::new()),
            work_ready: Condvar::new(),
            signalled: Condvar::new(),
            idle: Condvar::new(),
        }
    }

    /// Run `f` inside the critical section.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut QueueState) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state)
    }

    // ── Caller side ─────────────────────────────────────────────────

    /// Append a task, register its name and start a drain if the lane is idle.
    pub(crate) fn enqueue(&self, task: Task) {
        let mut state = self.state.lock();
        if let Some(name) = &task.name {
            state.names.insert(name);
        }
        debug!("Enqueued task {} ({})", task.display_name(), task.id);
        state.pending.push_back(task);
        let len = state.pending.len();
        state.metrics.observe_pending(len);

        // Starting a drain is idempotent: only the Idle -> Draining edge wakes the lane.
        if state.lane == LaneState::Idle {
            state.lane = LaneState::Draining;
            debug!("Drain started");
            self.work_ready.notify_one();
        }
    }

    pub(crate) fn signal(&self) {
        let mut state = self.state.lock();
        state.signal = true;
        state.metrics.signals_sent += 1;
        self.signalled.notify_one();
    }

    pub(crate) fn request_shutdown(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        self.work_ready.notify_one();
        // No handle is left to signal a waiting task, so wake it to give up.
        self.signalled.notify_one();
    }

    /// Block until the lane is idle or `deadline` passes.
    pub(crate) fn wait_idle_until(&self, deadline: Option<Instant>) -> bool {
        let mut state = self.state.lock();
        while !state.is_idle() {
            match deadline {
                Some(deadline) => {
                    if self.idle.wait_until(&mut state, deadline).timed_out() {
                        return state.is_idle();
                    }
                }
                None => self.idle.wait(&mut state),
            }
        }
        true
    }

    // ── Lane side ───────────────────────────────────────────────────

    /// Pop the head task, parking while the queue is empty.
    ///
    /// Returns `None` once shutdown was requested and nothing is left.
    pub(crate) fn next_task(&self) -> Option<Task> {
        let mut state = self.state.lock();
        loop {
            if let Some(task) = state.pending.pop_front() {
                state.lane = LaneState::Draining;
                state.current = Some(CurrentTask::from_task(&task));
                return Some(task);
            }
            if state.lane != LaneState::Idle {
                state.lane = LaneState::Idle;
                debug!("Drain complete");
                self.idle.notify_all();
            }
            if state.shutdown {
                return None;
            }
            self.work_ready.wait(&mut state);
        }
    }

    /// Park the current task until the signal flag is set, then consume it.
    ///
    /// Returns `false` if shutdown was requested with no signal pending. Once
    /// the last handle is gone no signal can ever arrive.
    pub(crate) fn await_signal(&self) -> bool {
        let mut state = self.state.lock();
        state.lane = LaneState::Waiting;
        while !state.signal {
            if state.shutdown {
                return false;
            }
            self.signalled.wait(&mut state);
        }
        state.signal = false;
        state.metrics.signals_consumed += 1;
        state.lane = LaneState::Draining;
        true
    }

    /// Give up on everything still queued after a wait that can never end.
    ///
    /// Clears the registry and current task and parks the lane as Idle. The
    /// abandoned tasks are handed back so they drop outside the lock.
    pub(crate) fn abandon(&self) -> VecDeque<Task> {
        let mut state = self.state.lock();
        let abandoned = std::mem::take(&mut state.pending);
        state.names = NameRegistry::default();
        state.current = None;
        state.lane = LaneState::Idle;
        self.idle.notify_all();
        abandoned
    }

    /// Deregister the finished task's name and record metrics.
    pub(crate) fn finish(&self, name: Option<&str>, duration: Duration) {
        let mut state = self.state.lock();
        if let Some(name) = name {
            state.names.remove(name);
        }
        state.current = None;
        state.metrics.record_execution(name, duration);
    }
}
