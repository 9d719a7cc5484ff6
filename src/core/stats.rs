//! Run-wide counters shared by every dispatcher.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Statistics about scheduler activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    /// Processes admitted by the loader.
    pub admitted: u64,
    /// Slices executed across all cores.
    pub slices: u64,
    /// Slices that ended in preemption.
    pub preemptions: u64,
    /// Processes that ran out of instructions.
    pub completed: u64,
    /// Processes discarded after an execution fault.
    pub blocked: u64,
    /// Stale ready entries dropped because the pool had no descriptor.
    pub missing_descriptors: u64,
    /// Total quantum consumed across all cores.
    pub cpu_time: u64,
}

/// Internal counters for scheduler statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct SchedulerCounters {
    pub admitted: AtomicU64,
    pub slices: AtomicU64,
    pub preemptions: AtomicU64,
    pub completed: AtomicU64,
    pub blocked: AtomicU64,
    pub missing_descriptors: AtomicU64,
    pub cpu_time: AtomicU64,
}

impl SchedulerCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            slices: self.slices.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            missing_descriptors: self.missing_descriptors.load(Ordering::Relaxed),
            cpu_time: self.cpu_time.load(Ordering::Acquire),
        }
    }
}
