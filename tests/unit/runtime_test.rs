//! Tests for the async facade and API helpers

use std::sync::Arc;

use prometheus_cpu_scheduler::core::{Alu, Instruction, Orchestrator, Scheduler, SchedulingPolicy};
use prometheus_cpu_scheduler::infra::PidAllocator;
use prometheus_cpu_scheduler::runtime::{
    health, run_async, submit_process, ProcessSubmission, RunSummary,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_async_drains_submissions() {
    let sched = Arc::new(Scheduler::default());
    let pids = PidAllocator::default();
    for quantum in [1, 2, 3] {
        submit_process(
            &sched,
            &pids,
            ProcessSubmission {
                priority: 0,
                quantum,
                instructions: vec![Instruction::Nop; 4],
                registers: None,
            },
        )
        .unwrap();
    }
    assert_eq!(health(&sched).live, 3);

    let orch = Arc::new(Orchestrator::new(
        2,
        SchedulingPolicy::ShortestRemainingQuantum,
        Arc::clone(&sched),
        Arc::new(Alu),
    ));
    let report = run_async(orch).await.unwrap();
    let summary = RunSummary::from(&report);

    assert_eq!(summary.completed, 3);
    assert_eq!(summary.cpu_time, 12);
    assert!(summary.failed_cores.is_empty());
    assert_eq!(health(&sched).live, 0);
}
