//! Pipeline state tracker
//!
//! All sender/receiver slots, endpoints and sessions pass state updates to the
//! tracker, so that the top-level source/sink can quickly check whether there
//! is any ongoing activity.
//!
//! ## Threading
//!
//! Writers are unbounded and uncoordinated (network receive thread, session
//! lifecycle, fault detection). The reader is usually the audio callback, so
//! every method is a single lock-free atomic operation: no locks, no
//! allocation, no logging.
//!
//! Each field is updated with `Ordering::Relaxed`. Reads of different fields
//! are not atomic with respect to each other; `get_state()` is a best-effort
//! snapshot and callers re-poll every cycle.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crossbeam::utils::CachePadded;

use crate::types::DeviceState;

/// Sticky fault/shutdown status
///
/// Ordered `Running < Broken < Closed`. The tracker only ever moves it
/// forward, so the discriminants double as lattice values for `fetch_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum HaltState {
    Running = 0,
    Broken = 1,
    Closed = 2,
}

impl HaltState {
    #[inline]
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => HaltState::Running,
            1 => HaltState::Broken,
            _ => HaltState::Closed,
        }
    }
}

/// Pipeline state tracker
///
/// One instance per sender or receiver, owned by the pipeline and shared with
/// its producers by reference (or `Arc`). Not `Clone`: a copy would silently
/// split the counters.
///
/// Thread-safe and lock-free.
pub struct StateTracker {
    /// Raw `HaltState`, only advanced with `fetch_max`
    halt_state: AtomicU8,
    /// Live sessions across all slots and endpoints
    active_sessions: CachePadded<AtomicUsize>,
    /// Packets admitted but not yet fully retired
    pending_packets: CachePadded<AtomicUsize>,
}

impl StateTracker {
    /// Create a running tracker with all counters at zero
    pub fn new() -> Self {
        Self {
            halt_state: AtomicU8::new(HaltState::Running as u8),
            active_sessions: CachePadded::new(AtomicUsize::new(0)),
            pending_packets: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    #[inline]
    fn halt_state(&self) -> HaltState {
        HaltState::from_raw(self.halt_state.load(Ordering::Relaxed))
    }

    /// Compute current state (lock-free)
    ///
    /// Shutdown dominates fault, fault dominates traffic. Pending packets
    /// alone are enough to report `Active`: a backlog has to drain before the
    /// device counts as idle.
    #[inline]
    pub fn get_state(&self) -> DeviceState {
        match self.halt_state() {
            HaltState::Closed => DeviceState::Closed,
            HaltState::Broken => DeviceState::Broken,
            HaltState::Running => {
                if self.active_sessions.load(Ordering::Relaxed) > 0
                    || self.pending_packets.load(Ordering::Relaxed) > 0
                {
                    DeviceState::Active
                } else {
                    DeviceState::Idle
                }
            }
        }
    }

    /// True if the device is neither broken nor closed
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.halt_state() == HaltState::Running
    }

    /// True if the device is closed
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.halt_state() == HaltState::Closed
    }

    /// Mark sender/receiver as broken
    ///
    /// No-op when already broken or closed.
    #[inline]
    pub fn set_broken(&self) {
        self.halt_state
            .fetch_max(HaltState::Broken as u8, Ordering::Relaxed);
    }

    /// Mark sender/receiver as closed
    ///
    /// Overrides a previous `set_broken()`. Closed is final.
    #[inline]
    pub fn set_closed(&self) {
        self.halt_state
            .fetch_max(HaltState::Closed as u8, Ordering::Relaxed);
    }

    /// Get active sessions counter (lock-free)
    #[inline]
    pub fn num_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Relaxed)
    }

    /// Get pending packets counter (lock-free)
    #[inline]
    pub fn num_pending_packets(&self) -> usize {
        self.pending_packets.load(Ordering::Relaxed)
    }

    /// Increment active sessions counter
    #[inline]
    pub fn register_session(&self) {
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement active sessions counter
    ///
    /// Must be paired with an earlier `register_session()`.
    #[inline]
    pub fn unregister_session(&self) {
        let released = release(&self.active_sessions);
        debug_assert!(released, "unregister_session() without matching register_session()");
    }

    /// Increment pending packets counter
    #[inline]
    pub fn register_packet(&self) {
        self.pending_packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement pending packets counter
    ///
    /// Must be paired with an earlier `register_packet()`.
    #[inline]
    pub fn unregister_packet(&self) {
        let released = release(&self.pending_packets);
        debug_assert!(released, "unregister_packet() without matching register_packet()");
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTracker")
            .field("halt_state", &self.halt_state())
            .field("active_sessions", &self.num_sessions())
            .field("pending_packets", &self.num_pending_packets())
            .finish()
    }
}

/// Decrement a counter, saturating at zero
///
/// Returns false if the counter was already zero (unbalanced caller).
#[inline]
fn release(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
        .is_ok()
}
