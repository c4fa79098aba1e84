//! Soak harness configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bench::BenchProfile;
use crate::soak::{SoakError, SoakResult};

/// Default file name for the soak config
pub const SOAK_CONFIG_FILE: &str = "soak.yaml";

/// Largest transition ringbuffer the harness will allocate
/// 1M transitions is ~24 MB, far beyond what a reader can observe in a run.
pub const MAX_TRANSITION_QUEUE_CAPACITY: usize = 1 << 20;

/// Soak run configuration
///
/// Thread and iteration defaults come from the build's [`BenchProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoakConfig {
    /// Concurrent writer threads (sessions + packets)
    pub writer_threads: usize,

    /// Session lifecycles each writer runs
    pub iterations_per_writer: usize,

    /// Packets admitted and retired per session
    pub packets_per_session: usize,

    /// Pause between reader polls in microseconds
    /// 0 busy-polls with `yield_now`, like a tight audio callback.
    pub poll_interval_us: u64,

    /// Writer 0 reports a device fault after this many iterations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_after_iterations: Option<usize>,

    /// Close the tracker once all writers are done
    pub close_on_finish: bool,

    /// Capacity of the reader's transition ringbuffer
    /// Transitions beyond this are dropped and counted.
    pub transition_queue_capacity: usize,
}

impl Default for SoakConfig {
    fn default() -> Self {
        let profile = BenchProfile::current();
        Self {
            writer_threads: profile.stress_threads(),
            iterations_per_writer: profile.stress_iterations(),
            packets_per_session: 4,
            poll_interval_us: 50,
            fault_after_iterations: None,
            close_on_finish: true,
            transition_queue_capacity: 1024,
        }
    }
}

impl SoakConfig {
    /// Reader poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    /// Reject configurations the harness can't run
    pub fn validate(&self) -> SoakResult<()> {
        if self.writer_threads == 0 {
            return Err(SoakError::InvalidConfig(
                "writer_threads must be at least 1".to_string(),
            ));
        }
        if self.transition_queue_capacity == 0 {
            return Err(SoakError::InvalidConfig(
                "transition_queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.transition_queue_capacity > MAX_TRANSITION_QUEUE_CAPACITY {
            return Err(SoakError::InvalidConfig(format!(
                "transition_queue_capacity ({}) exceeds maximum ({})",
                self.transition_queue_capacity, MAX_TRANSITION_QUEUE_CAPACITY
            )));
        }
        if let Some(after) = self.fault_after_iterations {
            if after > self.iterations_per_writer {
                return Err(SoakError::InvalidConfig(format!(
                    "fault_after_iterations ({}) exceeds iterations_per_writer ({})",
                    after, self.iterations_per_writer
                )));
            }
        }
        Ok(())
    }
}
