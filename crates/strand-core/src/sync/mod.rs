//! Blocking synchronization primitives
//!
//! Used by non-real-time threads only (harness coordination, shutdown
//! handshakes). Nothing in here may be called from an audio callback.

mod cond;

pub use cond::Cond;
