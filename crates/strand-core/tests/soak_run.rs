//! Soak runs driven through config files, the way the strand-soak binary does

use strand_core::config::{load_config, save_config, SoakConfig, SOAK_CONFIG_FILE};
use strand_core::soak::{run_soak, SoakError};
use strand_core::DeviceState;

fn quick_config() -> SoakConfig {
    SoakConfig {
        writer_threads: 3,
        iterations_per_writer: 200,
        packets_per_session: 3,
        poll_interval_us: 10,
        fault_after_iterations: None,
        close_on_finish: true,
        transition_queue_capacity: 1 << 16,
    }
}

#[test]
fn config_file_drives_soak() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SOAK_CONFIG_FILE);
    save_config(&quick_config(), &path).unwrap();

    let config: SoakConfig = load_config(&path);
    assert_eq!(config, quick_config());

    let report = run_soak(&config).unwrap();
    assert_eq!(report.final_state, DeviceState::Closed);
    assert_eq!(report.final_sessions, 0);
    assert_eq!(report.final_pending_packets, 0);
    assert!(report.max_sessions_seen <= config.writer_threads);
}

#[test]
fn injected_fault_is_reported_then_closed() {
    let config = SoakConfig {
        fault_after_iterations: Some(50),
        ..quick_config()
    };
    let report = run_soak(&config).unwrap();

    assert_eq!(report.final_state, DeviceState::Closed);
    assert_eq!(report.dropped_transitions, 0);

    let states: Vec<DeviceState> = report.transitions.iter().map(|t| t.to).collect();
    let closed_at = states.iter().position(|s| *s == DeviceState::Closed).unwrap();
    assert_eq!(closed_at, states.len() - 1);

    // Broken may be skipped if close lands between two polls; once seen,
    // only halted states follow
    if let Some(broken_at) = states.iter().position(|s| *s == DeviceState::Broken) {
        assert!(broken_at < closed_at);
        assert!(states[broken_at..].iter().all(|s| s.is_halted()));
    }
}

#[test]
fn report_serializes_to_yaml() {
    let report = run_soak(&quick_config()).unwrap();
    let yaml = serde_yaml::to_string(&report).unwrap();

    assert!(yaml.contains("final_state: Closed"));
    assert!(yaml.contains("transitions:"));
}

#[test]
fn invalid_config_from_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("soak.yaml");
    std::fs::write(&path, "writer_threads: 0\n").unwrap();

    let config: SoakConfig = load_config(&path);
    assert_eq!(config.writer_threads, 0);

    let err = run_soak(&config).unwrap_err();
    assert!(matches!(err, SoakError::InvalidConfig(_)));
    assert!(err.to_string().contains("writer_threads"));
}

#[test]
fn oversized_queue_from_file_is_rejected_not_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SOAK_CONFIG_FILE);
    std::fs::write(
        &path,
        format!(
            "writer_threads: 1\niterations_per_writer: 1\ntransition_queue_capacity: {}\n",
            usize::MAX
        ),
    )
    .unwrap();

    let config: SoakConfig = load_config(&path);
    assert_eq!(config.transition_queue_capacity, usize::MAX);

    let err = run_soak(&config).unwrap_err();
    assert!(matches!(err, SoakError::InvalidConfig(_)));
    assert!(err.to_string().contains("transition_queue_capacity"));
}
