//! Soak run: writer threads, polling reader, transition drain

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::SoakConfig;
use crate::pipeline::StateTracker;
use crate::sync::Cond;
use crate::types::DeviceState;

use super::{SoakError, SoakResult};

/// Pause between drain passes when the ringbuffer is empty
const DRAIN_IDLE_SLEEP: Duration = Duration::from_millis(1);

/// A change of device state observed by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateTransition {
    pub from: DeviceState,
    pub to: DeviceState,
    /// Poll on which `to` was first observed
    pub poll_index: u64,
}

/// Outcome of a soak run
#[derive(Debug, Clone, Serialize)]
pub struct SoakReport {
    /// Number of `get_state()` polls made by the reader
    pub polls: u64,
    /// Transitions in the order the reader saw them
    pub transitions: Vec<StateTransition>,
    /// Transitions lost because the ringbuffer was full
    pub dropped_transitions: u64,
    /// Highest session count sampled by the reader
    pub max_sessions_seen: usize,
    pub final_sessions: usize,
    pub final_pending_packets: usize,
    /// Last state sampled, after all writers were done
    pub final_state: DeviceState,
    pub elapsed_ms: u64,
}

/// Create the reader → drain ringbuffer
///
/// Producer side is owned by the polling reader, consumer side by the drain
/// thread. Pushing never blocks or allocates.
pub fn transition_channel(
    capacity: usize,
) -> (rtrb::Producer<StateTransition>, rtrb::Consumer<StateTransition>) {
    rtrb::RingBuffer::new(capacity)
}

/// What the reader learned while polling
struct ReaderStats {
    polls: u64,
    dropped: u64,
    max_sessions: usize,
    final_state: DeviceState,
}

/// Reader stats and drained transitions, collected inside the thread scope
type ScopeOutcome = (ReaderStats, Vec<StateTransition>);

/// Counts a writer as finished when dropped, including during unwinding
struct FinishGuard<'a>(&'a Cond<usize>);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() += 1;
        self.0.broadcast();
    }
}

/// Run one soak against a fresh tracker
pub fn run_soak(config: &SoakConfig) -> SoakResult<SoakReport> {
    config.validate()?;

    log::info!(
        "Starting soak: {} writers x {} iterations, {} packets/session, poll every {}us, fault after {:?}",
        config.writer_threads,
        config.iterations_per_writer,
        config.packets_per_session,
        config.poll_interval_us,
        config.fault_after_iterations
    );

    let tracker = StateTracker::new();
    let finished = Cond::new(0usize);
    let stop = AtomicBool::new(false);
    let (producer, consumer) = transition_channel(config.transition_queue_capacity);
    let started = Instant::now();

    let (reader_stats, transitions) = thread::scope(|scope| -> SoakResult<ScopeOutcome> {
        let tracker = &tracker;
        let finished = &finished;
        let stop = &stop;

        let drain = spawn_named(scope, "soak-drain".to_string(), move || drain_loop(consumer))?;
        let reader = spawn_named(scope, "soak-reader".to_string(), move || {
            poll_loop(tracker, producer, stop, config.poll_interval())
        })?;

        let mut writers = Vec::with_capacity(config.writer_threads);
        let mut spawn_error = None;
        for index in 0..config.writer_threads {
            let name = format!("soak-writer-{}", index);
            match spawn_named(scope, name, move || writer_loop(index, tracker, finished, config)) {
                Ok(handle) => writers.push(handle),
                Err(e) => {
                    spawn_error = Some(e);
                    break;
                }
            }
        }

        let spawned = writers.len();
        let guard = finished.lock();
        drop(finished.wait_while(guard, |done| *done < spawned));
        log::info!("All {} writers finished, stopping reader", spawned);

        if config.close_on_finish {
            tracker.set_closed();
        }
        stop.store(true, Ordering::Release);

        let reader_stats = join_named(reader, "soak-reader");
        let transitions = join_named(drain, "soak-drain");
        let writer_panics = writers
            .into_iter()
            .map(|writer| writer.join())
            .filter(Result::is_err)
            .count();

        if let Some(e) = spawn_error {
            return Err(e);
        }
        if writer_panics > 0 {
            return Err(SoakError::WorkerPanicked(format!(
                "{} of {} writers",
                writer_panics, spawned
            )));
        }

        Ok((reader_stats?, transitions?))
    })?;

    let report = SoakReport {
        polls: reader_stats.polls,
        transitions,
        dropped_transitions: reader_stats.dropped,
        max_sessions_seen: reader_stats.max_sessions,
        final_sessions: tracker.num_sessions(),
        final_pending_packets: tracker.num_pending_packets(),
        final_state: reader_stats.final_state,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    if report.dropped_transitions > 0 {
        log::warn!(
            "Transition queue overflowed: {} transitions dropped (capacity {})",
            report.dropped_transitions,
            config.transition_queue_capacity
        );
    }
    log::info!(
        "Soak finished in {} ms: {} polls, {} transitions, max {} sessions, final state {}",
        report.elapsed_ms,
        report.polls,
        report.transitions.len(),
        report.max_sessions_seen,
        report.final_state
    );

    Ok(report)
}

/// One writer: churn sessions and their packets
fn writer_loop(index: usize, tracker: &StateTracker, finished: &Cond<usize>, config: &SoakConfig) {
    let _finished = FinishGuard(finished);

    let fault_at = if index == 0 {
        config.fault_after_iterations
    } else {
        None
    };
    let inject_fault = |iteration: usize| {
        log::warn!(
            "soak-writer-{}: reporting device fault after {} iterations",
            index,
            iteration
        );
        tracker.set_broken();
    };

    for iteration in 0..config.iterations_per_writer {
        if fault_at == Some(iteration) {
            inject_fault(iteration);
        }

        tracker.register_session();
        for _ in 0..config.packets_per_session {
            tracker.register_packet();
        }
        for _ in 0..config.packets_per_session {
            tracker.unregister_packet();
        }
        tracker.unregister_session();
    }

    if fault_at == Some(config.iterations_per_writer) {
        inject_fault(config.iterations_per_writer);
    }
}

/// One reader-side sample per cycle, as an audio callback would take it
///
/// No locks, allocation or logging in here.
struct StatePoller<'a> {
    tracker: &'a StateTracker,
    producer: rtrb::Producer<StateTransition>,
    last: DeviceState,
    stats: ReaderStats,
}

impl<'a> StatePoller<'a> {
    fn new(tracker: &'a StateTracker, producer: rtrb::Producer<StateTransition>) -> Self {
        let last = tracker.get_state();
        Self {
            tracker,
            producer,
            last,
            stats: ReaderStats {
                polls: 0,
                dropped: 0,
                max_sessions: tracker.num_sessions(),
                final_state: last,
            },
        }
    }

    /// Sample the tracker once; queue a transition if the state changed
    ///
    /// A full queue drops the transition and counts it.
    fn poll(&mut self) {
        let state = self.tracker.get_state();
        self.stats.polls += 1;
        self.stats.max_sessions = self.stats.max_sessions.max(self.tracker.num_sessions());

        if state != self.last {
            let transition = StateTransition {
                from: self.last,
                to: state,
                poll_index: self.stats.polls,
            };
            if self.producer.push(transition).is_err() {
                self.stats.dropped += 1;
            }
            self.last = state;
        }
    }

    /// Stop polling; dropping the producer lets the drain thread finish
    fn finish(mut self) -> ReaderStats {
        self.stats.final_state = self.last;
        self.stats
    }
}

/// Reader: poll like an audio callback until told to stop
fn poll_loop(
    tracker: &StateTracker,
    producer: rtrb::Producer<StateTransition>,
    stop: &AtomicBool,
    interval: Duration,
) -> ReaderStats {
    let mut poller = StatePoller::new(tracker, producer);

    loop {
        // Flag first: the sample below then sees everything done before it was raised
        let stopping = stop.load(Ordering::Acquire);
        poller.poll();

        if stopping {
            break;
        }
        if interval.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(interval);
        }
    }

    poller.finish()
}

/// Drain transitions until the reader drops its producer
fn drain_loop(mut consumer: rtrb::Consumer<StateTransition>) -> Vec<StateTransition> {
    let mut transitions = Vec::new();

    loop {
        // Checked before popping so nothing pushed before abandonment is missed
        let abandoned = consumer.is_abandoned();

        while let Ok(transition) = consumer.pop() {
            log::debug!(
                "poll {}: {} -> {}",
                transition.poll_index,
                transition.from,
                transition.to
            );
            transitions.push(transition);
        }

        if abandoned {
            break;
        }
        thread::sleep(DRAIN_IDLE_SLEEP);
    }

    transitions
}

fn spawn_named<'scope, 'env, F, T>(
    scope: &'scope Scope<'scope, 'env>,
    name: String,
    f: F,
) -> SoakResult<ScopedJoinHandle<'scope, T>>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn_scoped(scope, f)
        .map_err(|source| SoakError::ThreadSpawn { name, source })
}

fn join_named<T>(handle: ScopedJoinHandle<'_, T>, name: &str) -> SoakResult<T> {
    handle
        .join()
        .map_err(|payload| SoakError::WorkerPanicked(format!("{}: {}", name, panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
