use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::task::{Task, Work};

use super::ComputeQueue;

impl ComputeQueue {
    /// Queue unnamed work behind everything already submitted.
    ///
    /// Never blocks on running work, only on the brief metadata update.
    pub fn submit<W: Work>(&self, work: W) {
        self.inner.serializer.enqueue(Task::new(None, false, Box::new(work)));
    }

    /// Queue named work.
    ///
    /// The name is registered before this returns, so an immediate
    /// [`contains_job`](Self::contains_job) sees it. It stays registered until
    /// the work has run and, with `wait_for_signal`, until a signal was
    /// consumed after it. While waiting the task keeps the lane to itself.
    pub fn submit_named<W: Work>(&self, name: impl Into<String>, wait_for_signal: bool, work: W) {
        self.inner
            .serializer
            .enqueue(Task::new(Some(name.into()), wait_for_signal, Box::new(work)));
    }

    /// Whether a task with this name is queued or still running.
    pub fn contains_job(&self, name: &str) -> bool {
        self.inner.serializer.with(|state| state.names.contains(name))
    }

    /// Release the waiting task, or the next task that waits.
    ///
    /// The flag is queue-global. Signalling with nothing waiting leaves it set
    /// until a waiting task consumes it. Repeated signals before that collapse
    /// into one.
    pub fn signal_proceed(&self) {
        debug!("Signal on {}", self.inner.label);
        self.inner.serializer.signal();
    }

    /// Block until the lane is idle with nothing queued.
    ///
    /// Returns `false` without waiting when called from inside a task, since
    /// the lane can't go idle while it is blocked here.
    pub fn wait_idle(&self) -> bool {
        if self.on_lane() {
            return false;
        }
        self.inner.serializer.wait_idle_until(None)
    }

    /// Like [`wait_idle`](Self::wait_idle) but gives up after `timeout`.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        if self.on_lane() {
            return false;
        }
        self.inner
            .serializer
            .wait_idle_until(Some(Instant::now() + timeout))
    }

    fn on_lane(&self) -> bool {
        let on_lane = thread::current().id() == self.inner.lane_thread;
        if on_lane {
            warn!("wait_idle called from inside a task on {}", self.inner.label);
        }
        on_lane
    }
}
