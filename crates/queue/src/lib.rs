//! Serial compute queue with named-job tracking and a signal handshake.
//!
//! A [`ComputeQueue`] runs submitted work one item at a time, in submission
//! order, on a single dedicated lane thread. Named submissions can be checked
//! with [`ComputeQueue::contains_job`] to avoid queueing duplicate jobs, and a
//! task submitted with `wait_for_signal` holds the lane after its work returns
//! until someone calls [`ComputeQueue::signal_proceed`].
//!
//! ```ignore
//! let queue = ComputeQueue::new("requirements")?;
//! if !queue.contains_job("6-3") {
//!     queue.submit_named("6-3", false, move || recompute("6-3"));
//! }
//! ```

pub mod config;
pub mod error;
mod lane;
pub mod metrics;
pub mod queue;
mod registry;
mod serializer;
pub mod task;

pub use config::QueueConfig;
pub use error::QueueError;
pub use metrics::QueueMetrics;
pub use queue::ComputeQueue;
pub use serializer::LaneState;
pub use task::{CurrentTask, Work};
