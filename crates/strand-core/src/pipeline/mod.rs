//! Pipeline control plane
//!
//! Everything here is shared between sender and receiver pipelines:
//! - StateTracker: lock-free aggregation of session, packet and fault signals

mod state_tracker;

pub use state_tracker::StateTracker;
