//! Soak harness for the pipeline state tracker
//!
//! Drives one [`StateTracker`](crate::pipeline::StateTracker) the way a live
//! pipeline does: many writer threads churn sessions and packets while a
//! reader polls `get_state()` like an audio callback.
//!
//! # Architecture
//!
//! ```text
//! writer 0..N ──register/unregister──► StateTracker ◄──get_state()── reader
//!      │                                                              │
//!      └──finished count──► Cond ◄──wait_while── main      rtrb push()│
//!                                                                     ▼
//!                                              drain thread ◄── transitions
//! ```
//!
//! The reader never locks, allocates or logs; transitions it observes go
//! through a lock-free ringbuffer and are logged by the drain thread.

mod error;
mod harness;

pub use error::{SoakError, SoakResult};
pub use harness::{run_soak, transition_channel, SoakReport, StateTransition};
