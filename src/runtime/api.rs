//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::{
    Instruction, Pid, ProcessDescriptor, Registers, RunReport, Scheduler, SchedulerError,
    SchedulingPolicy,
};
use crate::infra::PidAllocator;

/// Process submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSubmission {
    /// Scheduling priority.
    #[serde(default)]
    pub priority: i32,
    /// Time slice.
    pub quantum: u32,
    /// Program to run.
    pub instructions: Vec<Instruction>,
    /// Initial registers.
    #[serde(default)]
    pub registers: Option<Registers>,
}

/// Admission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    /// Assigned process id.
    pub pid: Pid,
    /// Processes live after admission.
    pub live: usize,
}

/// Condensed view of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run identifier.
    pub run_id: String,
    /// Policy used.
    pub policy: SchedulingPolicy,
    /// Dispatcher count.
    pub num_cores: usize,
    /// Wall-clock nanoseconds.
    pub elapsed_ns: u128,
    /// Slices executed.
    pub slices: u64,
    /// Processes completed.
    pub completed: u64,
    /// Processes blocked.
    pub blocked: u64,
    /// Quantum consumed.
    pub cpu_time: u64,
    /// Dispatchers that stopped on an error.
    pub failed_cores: Vec<usize>,
}

impl From<&RunReport> for RunSummary {
    fn from(report: &RunReport) -> Self {
        Self {
            run_id: report.run_id.clone(),
            policy: report.policy,
            num_cores: report.num_cores,
            elapsed_ns: report.elapsed_nanos(),
            slices: report.stats.slices,
            completed: report.stats.completed,
            blocked: report.stats.blocked,
            cpu_time: report.stats.cpu_time,
            failed_cores: report
                .cores
                .iter()
                .filter(|core| core.error.is_some())
                .map(|core| core.core_id)
                .collect(),
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Processes admitted and not yet retired.
    pub live: usize,
    /// Whether shutdown was requested.
    pub shutting_down: bool,
}

/// Admit a submitted process under a freshly allocated id.
///
/// # Errors
///
/// Propagates [`Scheduler::admit`] failures.
pub fn submit_process(
    scheduler: &Scheduler,
    pids: &PidAllocator,
    req: ProcessSubmission,
) -> Result<SubmissionResponse, SchedulerError> {
    let pid = pids.allocate();
    let mut descriptor = ProcessDescriptor::new(pid, req.priority, req.quantum, req.instructions);
    if let Some(registers) = req.registers {
        descriptor = descriptor.with_registers(registers);
    }
    scheduler.admit(descriptor)?;
    Ok(SubmissionResponse {
        pid,
        live: scheduler.live_processes(),
    })
}

/// Return a health payload.
#[must_use]
pub fn health(scheduler: &Scheduler) -> Health {
    let shutting_down = scheduler.is_shut_down();
    Health {
        ok: !shutting_down,
        live: scheduler.live_processes(),
        shutting_down,
    }
}
