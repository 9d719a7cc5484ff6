//! Audit records and sinks.
//!
//! Dispatchers emit one [`SliceRecord`] per executed slice. Sinks are
//! best-effort: a sink that cannot persist a record reports it through
//! `tracing` and drops it.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::process::{Instruction, Pid, ProcessState};

/// How a slice ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceOutcome {
    /// Quantum ran out; the process was re-queued and will resume later.
    Preempted,
    /// Every instruction executed; the process was retired.
    Completed,
    /// The execution unit faulted; the process was discarded.
    Blocked,
}

impl SliceOutcome {
    /// Upper-case name used in the text block.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preempted => "PREEMPTED",
            Self::Completed => "COMPLETED",
            Self::Blocked => "BLOCKED",
        }
    }

    /// True when the process will not be scheduled again.
    #[must_use]
    pub const fn is_final(self) -> bool {
        !matches!(self, Self::Preempted)
    }
}

/// Summary of one slice, in audit field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceRecord {
    /// Core that ran the slice.
    pub core_id: usize,
    /// Process identifier.
    pub pid: Pid,
    /// Quantum at slice start.
    pub initial_quantum: u32,
    /// Accumulated time at slice start.
    pub initial_timestamp: u64,
    /// Full instruction list of the process.
    pub instructions: Vec<Instruction>,
    /// State once the dispatcher took ownership.
    pub start_state: ProcessState,
    /// Last value produced by the execution unit.
    pub result: i64,
    /// Quantum left when the slice stopped, before any refill.
    pub final_quantum: u32,
    /// Accumulated time after the slice.
    pub final_timestamp: u64,
    /// Process priority.
    pub priority: i32,
    /// State when the slice stopped.
    pub final_state: ProcessState,
    /// Whether the slice was partial or final.
    pub outcome: SliceOutcome,
    /// Wall-clock milliseconds when the record was built.
    pub recorded_at_ms: u128,
}

impl SliceRecord {
    /// Quantum units consumed by this slice.
    #[must_use]
    pub const fn consumed(&self) -> u32 {
        self.initial_quantum.saturating_sub(self.final_quantum)
    }
}

impl fmt::Display for SliceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Process ID: {} ===", self.pid)?;
        writeln!(f, "Core: {}", self.core_id)?;
        writeln!(f, "Outcome: {}", self.outcome.as_str())?;
        writeln!(f, "Initial Quantum: {}", self.initial_quantum)?;
        writeln!(f, "Initial Timestamp: {}", self.initial_timestamp)?;
        writeln!(f, "Instructions:")?;
        for instruction in &self.instructions {
            writeln!(f, "  - {instruction}")?;
        }
        writeln!(f, "State: {}", self.start_state)?;
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Final Quantum: {}", self.final_quantum)?;
        writeln!(f, "Final Timestamp: {}", self.final_timestamp)?;
        writeln!(f, "Priority: {}", self.priority)?;
        writeln!(f, "Final State: {}", self.final_state)?;
        write!(f, "=============================")
    }
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record one slice. Must not fail the caller.
    fn record(&mut self, record: SliceRecord);
}

/// A shared sink: the caller keeps a handle and reads back what dispatchers wrote.
impl<S: AuditSink> AuditSink for Arc<Mutex<S>> {
    fn record(&mut self, record: SliceRecord) {
        self.lock().record(record);
    }
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    records: VecDeque<SliceRecord>,
    max_records: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer; oldest records are
    /// evicted first.
    #[must_use]
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records.min(1024)),
            max_records,
        }
    }

    /// Retrieve a snapshot of stored records.
    #[must_use]
    pub fn records(&self) -> Vec<SliceRecord> {
        self.records.iter().cloned().collect()
    }

    /// Records for one process, oldest first.
    #[must_use]
    pub fn records_for(&self, pid: Pid) -> Vec<SliceRecord> {
        self.records.iter().filter(|r| r.pid == pid).cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, record: SliceRecord) {
        if self.max_records == 0 {
            return;
        }
        if self.records.len() >= self.max_records {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }
}
