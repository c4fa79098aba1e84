//! Public API behaviour of the pipeline state tracker, as seen by the
//! producers (sessions, packet paths, fault detectors) and the polling sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use strand_core::bench::BenchProfile;
use strand_core::pipeline::StateTracker;
use strand_core::DeviceState;

#[test]
fn sink_sees_full_lifecycle() {
    let tracker = StateTracker::default();
    assert_eq!(tracker.get_state(), DeviceState::Idle);
    assert_eq!(tracker.num_sessions(), 0);
    assert!(tracker.is_usable());
    assert!(!tracker.is_closed());

    tracker.register_session();
    assert_eq!(tracker.get_state(), DeviceState::Active);

    tracker.unregister_session();
    assert_eq!(tracker.get_state(), DeviceState::Idle);

    tracker.set_broken();
    assert_eq!(tracker.get_state(), DeviceState::Broken);

    tracker.register_session();
    assert_eq!(tracker.get_state(), DeviceState::Broken);

    tracker.set_closed();
    assert_eq!(tracker.get_state(), DeviceState::Closed);
    assert!(tracker.is_closed());
    assert!(!tracker.is_usable());
}

#[test]
fn state_matches_counters_while_running() {
    let tracker = StateTracker::new();

    for (sessions, packets) in [(0, 0), (1, 0), (0, 3), (2, 5)] {
        for _ in 0..sessions {
            tracker.register_session();
        }
        for _ in 0..packets {
            tracker.register_packet();
        }

        let expected = if sessions > 0 || packets > 0 {
            DeviceState::Active
        } else {
            DeviceState::Idle
        };
        assert_eq!(tracker.get_state(), expected, "{} sessions, {} packets", sessions, packets);

        for _ in 0..sessions {
            tracker.unregister_session();
        }
        for _ in 0..packets {
            tracker.unregister_packet();
        }
        assert_eq!(tracker.get_state(), DeviceState::Idle);
    }
}

#[test]
fn closed_tracker_ignores_later_traffic_and_faults() {
    let tracker = StateTracker::new();
    tracker.register_session();
    tracker.set_closed();

    tracker.register_session();
    tracker.register_packet();
    tracker.set_broken();

    for _ in 0..10 {
        assert_eq!(tracker.get_state(), DeviceState::Closed);
        assert!(!tracker.is_usable());
    }
}

#[test]
fn shared_tracker_balances_across_producers() {
    let profile = BenchProfile::current();
    let tracker = Arc::new(StateTracker::new());
    let running = Arc::new(AtomicBool::new(true));

    // Sink thread: poll like an audio callback, every state must be a running one
    let sink = {
        let tracker = Arc::clone(&tracker);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut polls = 0u64;
            while running.load(Ordering::Relaxed) {
                let state = tracker.get_state();
                assert!(matches!(state, DeviceState::Active | DeviceState::Idle));
                assert!(tracker.is_usable());
                polls += 1;
            }
            polls
        })
    };

    let producers: Vec<_> = (0..profile.stress_threads())
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for _ in 0..profile.stress_iterations() / 10 {
                    tracker.register_session();
                    tracker.register_packet();
                    tracker.unregister_packet();
                    tracker.unregister_session();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    running.store(false, Ordering::Relaxed);
    sink.join().unwrap();

    assert_eq!(tracker.num_sessions(), 0);
    assert_eq!(tracker.num_pending_packets(), 0);
    assert_eq!(tracker.get_state(), DeviceState::Idle);
}

#[test]
fn fault_reported_from_another_thread_is_sticky() {
    let tracker = Arc::new(StateTracker::new());
    tracker.register_session();

    let detector = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || tracker.set_broken())
    };
    detector.join().unwrap();

    assert_eq!(tracker.get_state(), DeviceState::Broken);
    tracker.unregister_session();
    tracker.register_session();
    assert_eq!(tracker.get_state(), DeviceState::Broken);
    assert!(!tracker.is_closed());
}
