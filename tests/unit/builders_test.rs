//! Tests for building a scheduler from configuration

use prometheus_cpu_scheduler::builders::{build_orchestrator, build_scheduler};
use prometheus_cpu_scheduler::config::{AuditBackendConfig, AuditConfig, SimulatorConfig};
use prometheus_cpu_scheduler::core::SchedulingPolicy;
use prometheus_cpu_scheduler::infra::{demo_workload, PidAllocator};

#[test]
fn test_demo_workload_runs_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.data");
    let cfg = SimulatorConfig::new()
        .with_num_cores(2)
        .with_policy(SchedulingPolicy::Fcfs)
        .with_audit(AuditConfig {
            backend: AuditBackendConfig::File,
            path: path.clone(),
            ..AuditConfig::default()
        });

    let scheduler = build_scheduler(&cfg).unwrap();
    let ids = demo_workload()
        .admit_into(&scheduler, &PidAllocator::default())
        .unwrap();
    assert_eq!(ids.len(), 5);

    let report = build_orchestrator(&cfg, scheduler, None).unwrap().run().unwrap();
    // The fourth demo process divides by an unset register.
    assert_eq!(report.stats.blocked, 1);
    assert_eq!(report.stats.completed, 4);
    assert!(path.exists());
}
