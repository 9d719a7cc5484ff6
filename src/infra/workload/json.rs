//! JSON workload files.
//!
//! ```json
//! { "processes": [
//!     { "priority": 1, "quantum": 3,
//!       "instructions": [ { "op": "load", "dst": 0, "value": 4 }, { "op": "nop" } ] }
//! ] }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::{Instruction, Pid, ProcessDescriptor, Registers, Scheduler, SchedulerError};

/// Hands out process ids in increasing order, starting at 1.
#[derive(Debug)]
pub struct PidAllocator {
    next: AtomicU64,
}

impl Default for PidAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl PidAllocator {
    /// Allocator whose first id is `first`.
    #[must_use]
    pub const fn starting_at(first: Pid) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Next unused id.
    pub fn allocate(&self) -> Pid {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// One process in a workload file. Ids are assigned at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Scheduling priority.
    #[serde(default)]
    pub priority: i32,
    /// Time slice; also the initial quantum.
    pub quantum: u32,
    /// Program to run.
    pub instructions: Vec<Instruction>,
    /// Initial register values.
    #[serde(default)]
    pub registers: Option<Registers>,
}

impl ProcessSpec {
    fn into_descriptor(self, id: Pid) -> ProcessDescriptor {
        let descriptor = ProcessDescriptor::new(id, self.priority, self.quantum, self.instructions);
        match self.registers {
            Some(registers) => descriptor.with_registers(registers),
            None => descriptor,
        }
    }
}

/// A set of processes to admit before a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    /// Processes in admission order.
    pub processes: Vec<ProcessSpec>,
}

impl WorkloadSpec {
    /// Parse and validate a workload from JSON.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Workload` on malformed JSON or an invalid process.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let spec: Self = serde_json::from_str(input)
            .map_err(|e| SchedulerError::Workload(format!("parse error: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Reject processes that could never make progress.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Workload` naming the first offending process index.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        for (index, process) in self.processes.iter().enumerate() {
            if process.quantum == 0 && !process.instructions.is_empty() {
                return Err(SchedulerError::Workload(format!(
                    "process #{index}: quantum must be greater than 0"
                )));
            }
        }
        Ok(())
    }

    /// Number of processes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// True when there is nothing to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Build descriptors, drawing ids from `pids`.
    #[must_use]
    pub fn into_descriptors(self, pids: &PidAllocator) -> Vec<ProcessDescriptor> {
        self.processes
            .into_iter()
            .map(|process| process.into_descriptor(pids.allocate()))
            .collect()
    }

    /// Admit every process into `scheduler`; returns the assigned ids.
    ///
    /// # Errors
    ///
    /// Propagates admission failures; processes admitted before the failure stay admitted.
    pub fn admit_into(
        self,
        scheduler: &Scheduler,
        pids: &PidAllocator,
    ) -> Result<Vec<Pid>, SchedulerError> {
        let mut ids = Vec::with_capacity(self.len());
        for descriptor in self.into_descriptors(pids) {
            let id = descriptor.id();
            scheduler.admit(descriptor)?;
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Read a workload file.
///
/// # Errors
///
/// `SchedulerError::Workload` on I/O, parse or validation failure.
pub fn load_workload(path: impl AsRef<Path>) -> Result<WorkloadSpec, SchedulerError> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)
        .map_err(|e| SchedulerError::Workload(format!("{}: {e}", path.display())))?;
    WorkloadSpec::from_json_str(&input)
}

/// Small mixed workload used when no file is given.
#[must_use]
pub fn demo_workload() -> WorkloadSpec {
    use Instruction::{Add, Div, Load, Mov, Mul, Nop, Sub};

    let process = |priority, quantum, instructions| ProcessSpec {
        priority,
        quantum,
        instructions,
        registers: None,
    };

    WorkloadSpec {
        processes: vec![
            process(
                1,
                3,
                vec![
                    Load { dst: 0, value: 6 },
                    Load { dst: 1, value: 7 },
                    Mul { dst: 2, lhs: 0, rhs: 1 },
                    Mov { dst: 3, src: 2 },
                    Sub { dst: 4, lhs: 3, rhs: 0 },
                ],
            ),
            process(
                2,
                2,
                vec![Load { dst: 0, value: 1 }, Add { dst: 0, lhs: 0, rhs: 0 }, Nop],
            ),
            process(0, 5, vec![Nop; 4]),
            process(
                3,
                4,
                vec![Load { dst: 0, value: 9 }, Div { dst: 1, lhs: 0, rhs: 7 }, Nop],
            ),
            process(
                1,
                1,
                vec![Load { dst: 5, value: 40 }, Add { dst: 6, lhs: 5, rhs: 5 }],
            ),
        ],
    }
}
