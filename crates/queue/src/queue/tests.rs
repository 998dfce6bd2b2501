#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::config::QueueConfig;
    use crate::error::QueueError;
    use crate::queue::ComputeQueue;
    use crate::serializer::LaneState;

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Poll `cond` until it holds or the test timeout passes.
    fn eventually(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + TIMEOUT;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn queue_creation() {
        let queue = ComputeQueue::new("test-queue").unwrap();
        assert_eq!(queue.label(), "test-queue");
        assert_eq!(queue.lane_state(), LaneState::Idle);
        assert!(!queue.is_draining());
        assert_eq!(queue.pending_len(), 0);
        assert!(queue.current_task().is_none());
        assert_eq!(queue.metrics().total_executed, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = ComputeQueue::new("").unwrap_err();
        assert!(matches!(err, QueueError::Config(_)));
    }

    #[test]
    fn with_config_uses_stack_size() {
        let config = QueueConfig {
            label: "sized".into(),
            stack_size: Some(256 * 1024),
        };
        let queue = ComputeQueue::with_config(config).unwrap();
        let (tx, rx) = mpsc::channel();
        queue.submit(move || tx.send(()).unwrap());
        rx.recv_timeout(TIMEOUT).unwrap();
    }

    #[test]
    fn lane_thread_carries_label() {
        let queue = ComputeQueue::new("catalog-loader").unwrap();
        let (tx, rx) = mpsc::channel();
        queue.submit(move || {
            tx.send(thread::current().name().map(str::to_string)).unwrap();
        });
        let name = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(name.as_deref(), Some("catalog-loader"));
    }

    #[test]
    fn current_task_visible_while_running() {
        let queue = ComputeQueue::new("current").unwrap();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        queue.submit_named("road", false, move || {
            started_tx.send(()).unwrap();
            release_rx.recv_timeout(TIMEOUT).unwrap();
        });
        started_rx.recv_timeout(TIMEOUT).unwrap();

        let current = queue.current_task().expect("task should be current");
        assert_eq!(current.name.as_deref(), Some("road"));
        assert!(!current.wait_for_signal);
        assert_eq!(queue.lane_state(), LaneState::Draining);

        release_tx.send(()).unwrap();
        assert!(queue.wait_idle_timeout(TIMEOUT));
        assert!(queue.current_task().is_none());
    }

    #[test]
    fn waiting_state_until_signal() {
        let queue = ComputeQueue::new("waiting").unwrap();
        queue.submit_named("sync", true, || {});

        assert!(eventually(|| queue.lane_state() == LaneState::Waiting));
        assert!(queue.contains_job("sync"));
        assert!(queue.is_draining());

        queue.signal_proceed();
        assert!(queue.wait_idle_timeout(TIMEOUT));
        assert_eq!(queue.lane_state(), LaneState::Idle);
        assert!(!queue.contains_job("sync"));
    }

    #[test]
    fn metrics_after_drain() {
        let queue = ComputeQueue::new("metrics").unwrap();
        queue.submit(|| {});
        queue.submit_named("a", false, || {});
        queue.submit_named("a", true, || {});
        queue.signal_proceed();

        assert!(queue.wait_idle_timeout(TIMEOUT));
        let m = queue.metrics();
        assert_eq!(m.total_executed, 3);
        assert_eq!(m.tasks_executed["a"], 2);
        assert_eq!(m.signals_sent, 1);
        assert_eq!(m.signals_consumed, 1);
        assert!(m.max_pending >= 1);
    }

    #[test]
    fn wait_idle_inside_task_returns_false() {
        let queue = ComputeQueue::new("reentrant-wait").unwrap();
        let (tx, rx) = mpsc::channel();
        let q = queue.clone();
        queue.submit(move || {
            tx.send(q.wait_idle()).unwrap();
        });
        assert!(!rx.recv_timeout(TIMEOUT).unwrap());
    }

    #[test]
    fn dropping_last_handle_finishes_queued_work() {
        let (tx, rx) = mpsc::channel();
        {
            let queue = ComputeQueue::new("dropped").unwrap();
            for i in 0..3 {
                let tx = tx.clone();
                queue.submit(move || {
                    thread::sleep(Duration::from_millis(2));
                    tx.send(i).unwrap();
                });
            }
        }
        let got: Vec<i32> = (0..3).map(|_| rx.recv_timeout(TIMEOUT).unwrap()).collect();
        assert_eq!(got, vec![0, 1, 2]);
    }

    /// Reports whether a task ran before its closure was dropped.
    struct DropFlag {
        ran: bool,
        tx: mpsc::Sender<&'static str>,
    }

    impl Drop for DropFlag {
        fn drop(&mut self) {
            let _ = self.tx.send(if self.ran { "ran" } else { "dropped" });
        }
    }

    #[test]
    fn dropping_last_handle_while_waiting_releases_lane() {
        let (tx, rx) = mpsc::channel();
        let (waited_tx, waited_rx) = mpsc::channel();
        {
            let queue = ComputeQueue::new("abandoned").unwrap();
            queue.submit_named("w", true, move || waited_tx.send(()).unwrap());
            let flag = DropFlag { ran: false, tx };
            queue.submit_named("behind", false, move || {
                let mut flag = flag;
                flag.ran = true;
            });

            waited_rx.recv_timeout(TIMEOUT).unwrap();
            assert!(eventually(|| queue.lane_state() == LaneState::Waiting));
            assert!(queue.contains_job("behind"));
        }

        // The lane gave up on the wait and dropped the queued task unrun.
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), "dropped");
    }

    #[test]
    fn dropping_last_handle_with_pending_signal_still_drains() {
        let (tx, rx) = mpsc::channel();
        {
            let queue = ComputeQueue::new("signalled-drop").unwrap();
            queue.submit_named("w", true, || {});
            queue.signal_proceed();
            let flag = DropFlag { ran: false, tx };
            queue.submit(move || {
                let mut flag = flag;
                flag.ran = true;
            });
        }
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), "ran");
    }

    #[test]
    fn outstanding_names_counts_distinct() {
        let queue = ComputeQueue::new("names").unwrap();
        queue.submit_named("x", true, || {});
        queue.submit_named("x", false, || {});
        queue.submit_named("z", false, || {});
        assert_eq!(queue.outstanding_names(), 2);

        queue.signal_proceed();
        assert!(queue.wait_idle_timeout(TIMEOUT));
        assert_eq!(queue.outstanding_names(), 0);
    }

    #[test]
    fn debug_includes_label() {
        let queue = ComputeQueue::new("debuggable").unwrap();
        let s = format!("{:?}", queue);
        assert!(s.contains("debuggable"), "got: {s}");
    }
}
