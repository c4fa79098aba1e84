//! Common types for Strand
//!
//! Types shared between the pipeline, the soak harness and the top-level
//! audio I/O driver.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse activity classification of a sender or receiver
///
/// Derived on demand from the pipeline state tracker, never stored.
/// Consumers poll it every cycle, so it is level-triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceState {
    /// At least one session or in-flight packet
    Active,
    /// Running, but nothing to do right now
    Idle,
    /// Unrecoverable fault was reported; stays until closed
    Broken,
    /// Deliberately shut down
    Closed,
}

impl DeviceState {
    /// All states in precedence order, lowest first
    pub const ALL: [DeviceState; 4] = [
        DeviceState::Active,
        DeviceState::Idle,
        DeviceState::Broken,
        DeviceState::Closed,
    ];

    /// Get the name of this state
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Active => "active",
            DeviceState::Idle => "idle",
            DeviceState::Broken => "broken",
            DeviceState::Closed => "closed",
        }
    }

    /// True for Broken and Closed, i.e. no further traffic is expected
    #[inline]
    pub fn is_halted(&self) -> bool {
        matches!(self, DeviceState::Broken | DeviceState::Closed)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
