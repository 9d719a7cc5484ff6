//! Tests for audit sinks

use std::sync::Arc;

use parking_lot::Mutex;
use prometheus_cpu_scheduler::core::{
    Alu, Instruction, Orchestrator, ProcessDescriptor, Scheduler, SchedulingPolicy,
    SharedAuditSink,
};
use prometheus_cpu_scheduler::infra::FileAuditSink;

#[test]
fn test_file_sink_receives_every_slice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output").join("output.data");
    let shared: SharedAuditSink = Arc::new(Mutex::new(Box::new(FileAuditSink::new(&path))));

    let sched = Arc::new(Scheduler::default());
    sched
        .admit(ProcessDescriptor::new(1, 3, 2, vec![Instruction::Nop; 3]))
        .unwrap();
    Orchestrator::new(1, SchedulingPolicy::Fcfs, sched, Arc::new(Alu))
        .with_audit(Some(shared))
        .run()
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("=== Process ID: 1 ===").count(), 2);
    assert!(text.contains("Outcome: PREEMPTED"));
    assert!(text.contains("Outcome: COMPLETED"));
    assert!(text.contains("Priority: 3"));
    assert!(text.contains("  - NOP"));
}
