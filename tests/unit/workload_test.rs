//! Tests for workload files

use prometheus_cpu_scheduler::core::{Scheduler, SchedulerError};
use prometheus_cpu_scheduler::infra::{load_workload, PidAllocator};

#[test]
fn test_load_and_admit_workload_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workload.json");
    std::fs::write(
        &path,
        r#"{ "processes": [
            { "priority": 2, "quantum": 3, "instructions": [ { "op": "nop" } ] },
            { "quantum": 1, "instructions": [ { "op": "load", "dst": 0, "value": 1 },
                                              { "op": "sub", "dst": 1, "lhs": 0, "rhs": 0 } ] }
        ] }"#,
    )
    .unwrap();

    let spec = load_workload(&path).unwrap();
    let sched = Scheduler::default();
    let ids = spec.admit_into(&sched, &PidAllocator::starting_at(100)).unwrap();
    assert_eq!(ids, vec![100, 101]);
    assert_eq!(sched.live_processes(), 2);
    assert!(sched.memory_pool().contains(101));
}

#[test]
fn test_missing_workload_file() {
    let err = load_workload("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, SchedulerError::Workload(_)));
}
