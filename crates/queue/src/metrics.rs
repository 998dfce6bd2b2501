use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Queue operational metrics. Unnamed tasks only count toward totals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueMetrics {
    /// Total tasks executed, named or not.
    pub total_executed: u64,
    /// Tasks executed by name.
    pub tasks_executed: HashMap<String, u64>,
    /// Average work duration by task name (excludes time spent waiting).
    pub avg_task_duration: HashMap<String, Duration>,
    /// Last completion time by task name.
    pub last_run: HashMap<String, DateTime<Utc>>,
    /// Calls to `signal_proceed`.
    pub signals_sent: u64,
    /// Signals consumed by waiting tasks.
    pub signals_consumed: u64,
    /// Largest pending queue length observed.
    pub max_pending: usize,
}

impl QueueMetrics {
    /// Record a finished task.
    pub fn record_execution(&mut self, task_name: Option<&str>, duration: Duration) {
        self.total_executed += 1;
        let Some(task_name) = task_name else {
            return;
        };

        *self.tasks_executed.entry(task_name.to_string()).or_default() += 1;
        self.last_run.insert(task_name.to_string(), Utc::now());

        let count = self.tasks_executed[task_name];
        let prev_avg = self
            .avg_task_duration
            .get(task_name)
            .copied()
            .unwrap_or_default();

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        let new_avg = if count == 1 {
            duration
        } else {
            let prev_nanos = prev_avg.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };

        self.avg_task_duration.insert(task_name.to_string(), new_avg);
    }

    pub(crate) fn observe_pending(&mut self, len: usize) {
        self.max_pending = self.max_pending.max(len);
    }
}
