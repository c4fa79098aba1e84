//! Strand Core - pipeline state tracking for the strand streaming engine
//!
//! Sessions, endpoints, slots and packet paths of a sender or receiver report
//! into a [`pipeline::StateTracker`]; the top-level source/sink polls it once per
//! audio cycle to decide whether to keep pumping, tear down, or report a fault.

pub mod bench;
pub mod config;
pub mod pipeline;
pub mod soak;
pub mod sync;
pub mod types;

pub use types::*;
