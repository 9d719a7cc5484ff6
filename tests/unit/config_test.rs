//! Tests for configuration validation

use prometheus_cpu_scheduler::config::{AuditBackendConfig, AuditConfig, SimulatorConfig};
use prometheus_cpu_scheduler::core::{SchedulerError, SchedulingPolicy};

#[test]
fn test_simulator_config_validation() {
    let cfg = SimulatorConfig::new().with_num_cores(4).with_policy(SchedulingPolicy::Fcfs);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_invalid_idle_wait() {
    assert!(SimulatorConfig::new().with_idle_wait_ms(0).validate().is_err());
}

#[test]
fn test_in_memory_audit_needs_capacity() {
    let audit = AuditConfig {
        backend: AuditBackendConfig::InMemory,
        max_records: 0,
        ..AuditConfig::default()
    };
    assert!(SimulatorConfig::new().with_audit(audit).validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "num_cores": 3,
        "policy": "fcfs",
        "idle_wait_ms": 5,
        "abort_on_missing_descriptor": true,
        "audit": { "backend": "in_memory", "max_records": 50 }
    }"#;
    let cfg = SimulatorConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.resolved_cores(), 3);
    assert_eq!(cfg.policy, Some(SchedulingPolicy::Fcfs));
    assert!(cfg.abort_on_missing_descriptor);
    assert_eq!(cfg.audit.backend, AuditBackendConfig::InMemory);
    assert_eq!(cfg.audit.max_records, 50);
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.json");
    std::fs::write(&path, r#"{"policy":"srqf","audit":{"backend":"disabled"}}"#).unwrap();
    let cfg = SimulatorConfig::from_file(&path).unwrap();
    assert_eq!(cfg.policy, Some(SchedulingPolicy::ShortestRemainingQuantum));

    let missing = SimulatorConfig::from_file(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, SchedulerError::InvalidConfig(_)));
}

#[test]
fn test_unknown_policy_rejected() {
    assert!(SimulatorConfig::from_json_str(r#"{"policy":"lottery"}"#).is_err());
}
