//! The public compute queue.
//!
//! Split into focused submodules:
//! - `core`: handle type, construction, lifecycle and introspection
//! - `ops`: submit, membership, signalling and idle waits

mod core;
mod ops;
#[cfg(test)]
mod tests;

pub use self::core::ComputeQueue;
