//! Per-core dispatch loop: claim, run one slice, then re-queue or retire.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::core::executor::ExecutionUnit;
use crate::core::process::{ProcessDescriptor, ProcessState};
use crate::core::{AuditSink, Scheduler, SchedulingPolicy, SliceOutcome, SliceRecord};
use crate::util::clock::now_ms;

/// Audit sink shared by every dispatcher of a run.
pub type SharedAuditSink = Arc<Mutex<Box<dyn AuditSink>>>;

/// What one dispatcher did before its loop ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherReport {
    /// Simulated core index.
    pub core_id: usize,
    /// Slices executed.
    pub slices: u64,
    /// Slices that ended in preemption.
    pub preemptions: u64,
    /// Processes this core retired as complete.
    pub completed: u64,
    /// Processes this core discarded after a fault.
    pub blocked: u64,
    /// Quantum consumed on this core.
    pub consumed: u64,
    /// Set when the loop ended on an error instead of running out of work.
    pub error: Option<String>,
}

impl DispatcherReport {
    fn absorb(&mut self, outcome: SliceOutcome, consumed: u32) {
        self.slices += 1;
        self.consumed += u64::from(consumed);
        match outcome {
            SliceOutcome::Preempted => self.preemptions += 1,
            SliceOutcome::Completed => self.completed += 1,
            SliceOutcome::Blocked => self.blocked += 1,
        }
    }
}

/// One simulated CPU core.
///
/// Locks are only taken inside [`Scheduler::claim`], the requeue/retire
/// bookkeeping and the audit write; instruction execution runs unlocked.
pub struct Dispatcher {
    core_id: usize,
    policy: SchedulingPolicy,
    scheduler: Arc<Scheduler>,
    unit: Arc<dyn ExecutionUnit>,
    audit: Option<SharedAuditSink>,
}

impl Dispatcher {
    /// Create a dispatcher for `core_id`.
    pub fn new(
        core_id: usize,
        policy: SchedulingPolicy,
        scheduler: Arc<Scheduler>,
        unit: Arc<dyn ExecutionUnit>,
    ) -> Self {
        Self {
            core_id,
            policy,
            scheduler,
            unit,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Option<SharedAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Core index.
    #[must_use]
    pub const fn core_id(&self) -> usize {
        self.core_id
    }

    /// Run until no work can remain, the scheduler shuts down, a claim
    /// fails, or a slice panics.
    ///
    /// A panic in the execution unit or audit sink retires the claimed
    /// process as blocked and ends this core's loop with the panic recorded
    /// in the report, so the other cores still terminate.
    pub fn run(&self) -> DispatcherReport {
        let mut report = DispatcherReport {
            core_id: self.core_id,
            ..DispatcherReport::default()
        };
        debug!(core_id = self.core_id, policy = %self.policy, "dispatcher started");

        loop {
            let descriptor = match self.scheduler.claim(self.policy) {
                Ok(Some(descriptor)) => descriptor,
                Ok(None) => break,
                Err(e) => {
                    error!(core_id = self.core_id, error = %e, "claim failed, dispatcher stopping");
                    report.error = Some(e.to_string());
                    break;
                }
            };

            let pid = descriptor.id();
            let slice = panic::catch_unwind(AssertUnwindSafe(|| {
                let (record, descriptor) = self.run_slice(descriptor);
                let outcome = record.outcome;
                let consumed = record.consumed();
                // Recorded before the descriptor is visible to other cores, so
                // one process's records stay in slice order.
                self.emit(record);
                (outcome, consumed, descriptor)
            }));

            match slice {
                Ok((outcome, consumed, descriptor)) => {
                    report.absorb(outcome, consumed);
                    self.dispose(outcome, descriptor);
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!(
                        core_id = self.core_id,
                        pid,
                        reason = %reason,
                        "slice panicked, process blocked"
                    );
                    self.scheduler.retire(pid, SliceOutcome::Blocked);
                    report.blocked += 1;
                    report.error = Some(format!("pid {pid}: slice panicked: {reason}"));
                    break;
                }
            }
        }

        debug!(core_id = self.core_id, slices = report.slices, "dispatcher exiting");
        report
    }

    /// Execute one slice of `descriptor` on this core.
    ///
    /// Runs the remaining instructions in order until the quantum hits zero
    /// with work left (preempted), the execution unit faults (blocked), or the
    /// instructions run out (completed, recorded as `READY` like any process
    /// between instructions). The slice's consumption is added to the
    /// descriptor's timestamp and to the run-wide counter.
    pub fn run_slice(&self, mut descriptor: ProcessDescriptor) -> (SliceRecord, ProcessDescriptor) {
        descriptor.state = ProcessState::Running;
        let start_state = descriptor.state;
        let initial_quantum = descriptor.quantum;
        let initial_timestamp = descriptor.timestamp;

        info!(
            core_id = self.core_id,
            pid = descriptor.id(),
            quantum = initial_quantum,
            "processing"
        );

        let mut outcome = SliceOutcome::Completed;
        let mut executed = 0usize;
        while let Some(instruction) = descriptor.remaining_instructions().first().copied() {
            // A slice that starts with no budget goes to the unit and faults
            // instead of being re-queued forever.
            if descriptor.quantum == 0 && executed > 0 {
                info!(pid = descriptor.id(), "quantum exhausted, preempting");
                descriptor.state = ProcessState::Ready;
                outcome = SliceOutcome::Preempted;
                break;
            }

            match self
                .unit
                .execute(&mut descriptor.registers, &instruction, &mut descriptor.quantum)
            {
                Ok(value) => {
                    descriptor.result = value;
                    descriptor.pc += 1;
                    executed += 1;
                }
                Err(fault) => {
                    warn!(
                        core_id = self.core_id,
                        pid = descriptor.id(),
                        instruction = %instruction,
                        fault = %fault,
                        "execution fault, process blocked"
                    );
                    descriptor.state = ProcessState::Blocked;
                    outcome = SliceOutcome::Blocked;
                    break;
                }
            }
        }

        if outcome == SliceOutcome::Completed {
            descriptor.state = ProcessState::Ready;
        }

        let consumed = initial_quantum.saturating_sub(descriptor.quantum);
        descriptor.timestamp += u64::from(consumed);
        self.scheduler
            .record_slice(consumed, outcome == SliceOutcome::Preempted);

        let record = SliceRecord {
            core_id: self.core_id,
            pid: descriptor.id(),
            initial_quantum,
            initial_timestamp,
            instructions: descriptor.instructions().to_vec(),
            start_state,
            result: descriptor.result,
            final_quantum: descriptor.quantum,
            final_timestamp: descriptor.timestamp,
            priority: descriptor.priority(),
            final_state: descriptor.state,
            outcome,
            recorded_at_ms: now_ms(),
        };
        (record, descriptor)
    }

    fn emit(&self, record: SliceRecord) {
        if let Some(audit) = &self.audit {
            audit.lock().record(record);
        }
    }

    fn dispose(&self, outcome: SliceOutcome, descriptor: ProcessDescriptor) {
        let pid = descriptor.id();
        if outcome.is_final() {
            debug!(core_id = self.core_id, pid, outcome = outcome.as_str(), "process retired");
            self.scheduler.retire(pid, outcome);
        } else if let Err(e) = self.scheduler.requeue(descriptor) {
            error!(core_id = self.core_id, pid, error = %e, "requeue failed, process lost");
            self.scheduler.retire(pid, SliceOutcome::Blocked);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::executor::Alu;
    use crate::core::process::Instruction;
    use crate::core::InMemoryAuditSink;

    fn dispatcher(scheduler: &Arc<Scheduler>) -> Dispatcher {
        Dispatcher::new(0, SchedulingPolicy::Fcfs, Arc::clone(scheduler), Arc::new(Alu))
    }

    #[test]
    fn test_slice_preempts_with_exact_suffix() {
        let sched = Arc::new(Scheduler::default());
        let d = dispatcher(&sched);
        let pcb = ProcessDescriptor::new(
            1,
            0,
            2,
            vec![
                Instruction::Load { dst: 0, value: 3 },
                Instruction::Load { dst: 1, value: 4 },
                Instruction::Add { dst: 2, lhs: 0, rhs: 1 },
            ],
        );

        let (record, pcb) = d.run_slice(pcb);
        assert_eq!(record.outcome, SliceOutcome::Preempted);
        assert_eq!(record.final_quantum, 0);
        assert_eq!(record.consumed(), 2);
        assert_eq!(pcb.state(), ProcessState::Ready);
        assert_eq!(pcb.remaining_instructions(), &[Instruction::Add { dst: 2, lhs: 0, rhs: 1 }]);
        assert_eq!(pcb.timestamp(), 2);
    }

    #[test]
    fn test_slice_completes_when_quantum_hits_zero_on_last_instruction() {
        let sched = Arc::new(Scheduler::default());
        let d = dispatcher(&sched);
        let pcb = ProcessDescriptor::new(1, 0, 2, vec![Instruction::Nop; 2]);

        let (record, pcb) = d.run_slice(pcb);
        assert_eq!(record.outcome, SliceOutcome::Completed);
        assert!(pcb.is_finished());
        assert_eq!(record.final_quantum, 0);
        assert_eq!(record.start_state, ProcessState::Running);
        assert_eq!(record.final_state, ProcessState::Ready);
    }

    #[test]
    fn test_slice_blocks_on_fault() {
        let sched = Arc::new(Scheduler::default());
        let d = dispatcher(&sched);
        let pcb = ProcessDescriptor::new(
            4,
            1,
            10,
            vec![
                Instruction::Load { dst: 0, value: 8 },
                Instruction::Div { dst: 1, lhs: 0, rhs: 2 },
                Instruction::Nop,
            ],
        );

        let (record, pcb) = d.run_slice(pcb);
        assert_eq!(record.outcome, SliceOutcome::Blocked);
        assert_eq!(record.final_state, ProcessState::Blocked);
        assert_eq!(record.result, 8);
        assert_eq!(pcb.program_counter(), 1);
        assert_eq!(record.consumed(), 2);
    }

    struct PanickingUnit;

    impl ExecutionUnit for PanickingUnit {
        fn execute(
            &self,
            _registers: &mut crate::core::Registers,
            _instruction: &Instruction,
            _quantum: &mut u32,
        ) -> Result<i64, crate::core::ExecutionFault> {
            panic!("unit exploded");
        }
    }

    #[test]
    fn test_panicking_slice_is_reported_and_retired() {
        let sched = Arc::new(Scheduler::default());
        sched
            .admit(ProcessDescriptor::new(3, 0, 2, vec![Instruction::Nop]))
            .unwrap();
        let d = Dispatcher::new(
            5,
            SchedulingPolicy::Fcfs,
            Arc::clone(&sched),
            Arc::new(PanickingUnit),
        );

        let report = d.run();
        assert_eq!(report.blocked, 1);
        assert_eq!(report.slices, 0);
        let error = report.error.unwrap();
        assert!(error.contains("pid 3"));
        assert!(error.contains("unit exploded"));
        assert_eq!(sched.live_processes(), 0);
        assert_eq!(sched.stats().blocked, 1);
        assert!(sched.claim(SchedulingPolicy::Fcfs).unwrap().is_none());
    }

    #[test]
    fn test_zero_quantum_process_blocks_instead_of_spinning() {
        let sched = Arc::new(Scheduler::default());
        let d = dispatcher(&sched);
        let (record, pcb) = d.run_slice(ProcessDescriptor::new(9, 0, 0, vec![Instruction::Nop]));
        assert_eq!(record.outcome, SliceOutcome::Blocked);
        assert_eq!(record.consumed(), 0);
        assert_eq!(pcb.program_counter(), 0);
    }

    #[test]
    fn test_run_drains_and_audits() {
        let sched = Arc::new(Scheduler::default());
        sched
            .admit(ProcessDescriptor::new(1, 0, 1, vec![Instruction::Nop; 3]))
            .unwrap();
        let sink = Arc::new(Mutex::new(InMemoryAuditSink::new(16)));
        let shared: SharedAuditSink = Arc::new(Mutex::new(Box::new(Arc::clone(&sink))));

        let report = dispatcher(&sched).with_audit(Some(shared)).run();
        assert_eq!(report.slices, 3);
        assert_eq!(report.preemptions, 2);
        assert_eq!(report.completed, 1);
        assert_eq!(report.consumed, 3);
        assert!(report.error.is_none());

        let records = sink.lock().records_for(1);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].final_timestamp, 3);
        assert!(sched.memory_pool().is_empty());
        assert_eq!(sched.live_processes(), 0);
    }
}
