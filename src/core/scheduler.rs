//! Shared scheduler state: ready queue, memory pool, and the claim protocol
//! that keeps them consistent across dispatchers.
//!
//! # Locking
//!
//! Claiming a process is two steps (select an entry, take the descriptor),
//! each against its own structure. The claim holds the ready-queue lock while
//! it takes from the memory pool, and every path that touches both (admit,
//! claim, requeue) acquires them in the same order: ready queue, then memory
//! pool. A ready entry whose descriptor is gone is dropped and selection
//! repeats, so the two structures never disagree for longer than one claim.
//!
//! Ids owned by a dispatcher are tracked in a set guarded by its own mutex,
//! always taken after the ready-queue lock. An id is therefore in exactly one
//! place: the pool (with a ready entry) or the owned set.
//!
//! A claimer with nothing to select returns once no core owns a process, since
//! only a running process can put work back. Shutdown is an explicit flag.
//! The owned set and the flag both change under the ready-queue lock so a
//! dispatcher sleeping on the condvar cannot miss the wakeup.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::core::memory_pool::MemoryPool;
use crate::core::process::{Pid, ProcessDescriptor, ProcessState};
use crate::core::ready_queue::ReadyQueue;
use crate::core::stats::{SchedulerCounters, SchedulerStats};
use crate::core::{SchedulerError, SchedulingPolicy, SliceOutcome};

/// Default sleep bound for an idle dispatcher.
pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_millis(1);

/// Ready queue, memory pool and run-wide bookkeeping shared by all cores.
#[derive(Debug)]
pub struct Scheduler {
    ready: ReadyQueue,
    memory: MemoryPool,
    live: AtomicUsize,
    owned: Mutex<HashSet<Pid>>,
    shutdown: AtomicBool,
    counters: SchedulerCounters,
    idle_wait: Duration,
    abort_on_missing_descriptor: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_WAIT)
    }
}

impl Scheduler {
    /// Create an empty scheduler. `idle_wait` bounds each condvar sleep.
    #[must_use]
    pub fn new(idle_wait: Duration) -> Self {
        Self {
            ready: ReadyQueue::new(),
            memory: MemoryPool::new(),
            live: AtomicUsize::new(0),
            owned: Mutex::new(HashSet::new()),
            shutdown: AtomicBool::new(false),
            counters: SchedulerCounters::default(),
            idle_wait,
            abort_on_missing_descriptor: false,
        }
    }

    /// End a dispatcher's loop when a claimed id has no descriptor, instead of
    /// dropping the stale entry and claiming again.
    #[must_use]
    pub fn with_abort_on_missing_descriptor(mut self, abort: bool) -> Self {
        self.abort_on_missing_descriptor = abort;
        self
    }

    /// Admit a new process: descriptor into the pool, entry into the queue.
    ///
    /// # Errors
    ///
    /// `SchedulerError::DuplicateProcess` if the id is already waiting or owned
    /// by a dispatcher; nothing is queued in that case.
    pub fn admit(&self, mut descriptor: ProcessDescriptor) -> Result<(), SchedulerError> {
        descriptor.state = ProcessState::Ready;
        let (id, quantum, priority) =
            (descriptor.id(), descriptor.quantum(), descriptor.priority());

        let mut ready = self.ready.lock();
        if self.owned.lock().contains(&id) {
            return Err(SchedulerError::DuplicateProcess(id));
        }
        self.memory.insert(descriptor)?;
        ready.push(id, quantum, priority);
        self.live.fetch_add(1, Ordering::AcqRel);
        drop(ready);

        self.ready.notify_one();
        self.counters.admitted.fetch_add(1, Ordering::Relaxed);
        debug!(pid = id, quantum, priority, "process admitted");
        Ok(())
    }

    /// Claim the next process under `policy`, sleeping while nothing is ready.
    ///
    /// Returns `Ok(None)` once nothing is ready and no core owns a process,
    /// or after [`Scheduler::shutdown`].
    ///
    /// # Errors
    ///
    /// `SchedulerError::MissingDescriptor` when the claimed id has no
    /// descriptor and abort-on-missing is enabled.
    pub fn claim(
        &self,
        policy: SchedulingPolicy,
    ) -> Result<Option<ProcessDescriptor>, SchedulerError> {
        let mut ready = self.ready.lock();
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                return Ok(None);
            }

            if let Some(entry) = ready.take_next(policy) {
                if let Some(descriptor) = self.memory.take_by_id(entry.id) {
                    self.owned.lock().insert(entry.id);
                    return Ok(Some(descriptor));
                }
                self.counters.missing_descriptors.fetch_add(1, Ordering::Relaxed);
                if self.abort_on_missing_descriptor {
                    return Err(SchedulerError::MissingDescriptor(entry.id));
                }
                warn!(pid = entry.id, "ready entry without descriptor, dropped");
                continue;
            }

            if self.owned.lock().is_empty() {
                return Ok(None);
            }

            self.ready.wait_for_work(&mut ready, self.idle_wait);
        }
    }

    /// Return a preempted process to the queue with a fresh quantum.
    ///
    /// On error the caller still owns the process and must retire it.
    pub(crate) fn requeue(&self, mut descriptor: ProcessDescriptor) -> Result<(), SchedulerError> {
        descriptor.state = ProcessState::Ready;
        descriptor.refill_quantum();
        let (id, quantum, priority) =
            (descriptor.id(), descriptor.quantum(), descriptor.priority());

        let mut ready = self.ready.lock();
        self.memory.insert(descriptor)?;
        ready.push(id, quantum, priority);
        self.owned.lock().remove(&id);
        drop(ready);

        self.ready.notify_one();
        Ok(())
    }

    /// Account for process `id` leaving the system for good.
    pub(crate) fn retire(&self, id: Pid, outcome: SliceOutcome) {
        match outcome {
            SliceOutcome::Completed => self.counters.completed.fetch_add(1, Ordering::Relaxed),
            SliceOutcome::Blocked => self.counters.blocked.fetch_add(1, Ordering::Relaxed),
            SliceOutcome::Preempted => 0,
        };

        let ready = self.ready.lock();
        let _ = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        let idle = {
            let mut owned = self.owned.lock();
            owned.remove(&id);
            owned.is_empty() && ready.len() == 0
        };
        drop(ready);

        if idle {
            debug!("last running process retired");
            self.ready.notify_all();
        }
    }

    /// Add one slice's consumption to the run-wide counters.
    pub(crate) fn record_slice(&self, consumed: u32, preempted: bool) {
        self.counters.slices.fetch_add(1, Ordering::Relaxed);
        self.counters.cpu_time.fetch_add(u64::from(consumed), Ordering::AcqRel);
        if preempted {
            self.counters.preemptions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Stop all dispatchers at their next claim. Queued processes stay queued.
    pub fn shutdown(&self) {
        let ready = self.ready.lock();
        let already = self.shutdown.swap(true, Ordering::AcqRel);
        drop(ready);
        if !already {
            info!(live = self.live_processes(), "scheduler shutdown requested");
        }
        self.ready.notify_all();
    }

    /// Whether [`Scheduler::shutdown`] was called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Processes admitted and not yet completed or blocked.
    #[must_use]
    pub fn live_processes(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// The ready queue, for inspection.
    #[must_use]
    pub const fn ready_queue(&self) -> &ReadyQueue {
        &self.ready
    }

    /// The memory pool, for inspection.
    #[must_use]
    pub const fn memory_pool(&self) -> &MemoryPool {
        &self.memory
    }

    /// Get current scheduler statistics.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::Instruction;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn pcb(id: u64, quantum: u32) -> ProcessDescriptor {
        ProcessDescriptor::new(id, 0, quantum, vec![Instruction::Nop])
    }

    #[test]
    fn test_claim_on_empty_returns_none() {
        let sched = Scheduler::default();
        assert!(sched.claim(SchedulingPolicy::Fcfs).unwrap().is_none());
    }

    #[test]
    fn test_admit_then_claim() {
        let sched = Scheduler::default();
        sched.admit(pcb(1, 5)).unwrap();
        sched.admit(pcb(2, 2)).unwrap();
        assert_eq!(sched.live_processes(), 2);

        let d = sched.claim(SchedulingPolicy::ShortestRemainingQuantum).unwrap().unwrap();
        assert_eq!(d.id(), 2);
        assert!(!sched.memory_pool().contains(2));
        assert_eq!(sched.ready_queue().len(), 1);
    }

    #[test]
    fn test_duplicate_admit_leaves_queue_untouched() {
        let sched = Scheduler::default();
        sched.admit(pcb(1, 5)).unwrap();
        assert!(sched.admit(pcb(1, 5)).is_err());
        assert_eq!(sched.ready_queue().len(), 1);
        assert_eq!(sched.live_processes(), 1);
    }

    #[test]
    fn test_admit_rejects_id_owned_by_a_core() {
        let sched = Scheduler::default();
        sched.admit(pcb(1, 5)).unwrap();
        let owned = sched.claim(SchedulingPolicy::Fcfs).unwrap().unwrap();

        let err = sched.admit(pcb(1, 2)).unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateProcess(1)));
        assert!(!sched.memory_pool().contains(1));
        assert!(sched.ready_queue().is_empty());

        // The owner's descriptor still goes back intact.
        sched.requeue(owned).unwrap();
        assert_eq!(sched.memory_pool().take_by_id(1).unwrap().quantum(), 5);
    }

    #[test]
    fn test_retired_id_can_be_admitted_again() {
        let sched = Scheduler::default();
        sched.admit(pcb(1, 1)).unwrap();
        let _done = sched.claim(SchedulingPolicy::Fcfs).unwrap().unwrap();
        sched.retire(1, SliceOutcome::Completed);
        sched.admit(pcb(1, 1)).unwrap();
        assert_eq!(sched.live_processes(), 1);
    }

    #[test]
    fn test_stale_entry_is_skipped() {
        let sched = Scheduler::default();
        sched.ready_queue().insert(99, 1, 0);
        sched.admit(pcb(1, 3)).unwrap();

        let d = sched.claim(SchedulingPolicy::Fcfs).unwrap().unwrap();
        assert_eq!(d.id(), 1);
        assert_eq!(sched.stats().missing_descriptors, 1);
    }

    #[test]
    fn test_lost_descriptor_does_not_stall_claims() {
        let sched = Scheduler::default();
        sched.admit(pcb(1, 1)).unwrap();
        assert!(sched.memory_pool().take_by_id(1).is_some());

        assert!(sched.claim(SchedulingPolicy::Fcfs).unwrap().is_none());
        assert_eq!(sched.stats().missing_descriptors, 1);
    }

    #[test]
    fn test_stale_entry_aborts_when_configured() {
        let sched = Scheduler::default().with_abort_on_missing_descriptor(true);
        sched.ready_queue().insert(99, 1, 0);
        sched.admit(pcb(1, 3)).unwrap();

        let err = sched.claim(SchedulingPolicy::Fcfs).unwrap_err();
        assert!(matches!(err, SchedulerError::MissingDescriptor(99)));
    }

    #[test]
    fn test_requeue_refills_quantum() {
        let sched = Scheduler::default();
        sched.admit(pcb(1, 4)).unwrap();
        let mut d = sched.claim(SchedulingPolicy::Fcfs).unwrap().unwrap();
        d.quantum = 0;
        sched.requeue(d).unwrap();

        let entry = *sched.ready_queue().snapshot().iter().next().unwrap();
        assert_eq!(entry.quantum, 4);
        assert_eq!(sched.claim(SchedulingPolicy::Fcfs).unwrap().unwrap().quantum(), 4);
    }

    #[test]
    fn test_retire_wakes_idle_claimers() {
        let sched = Arc::new(Scheduler::new(Duration::from_secs(5)));
        sched.admit(pcb(1, 1)).unwrap();
        let _owned = sched.claim(SchedulingPolicy::Fcfs).unwrap().unwrap();

        let waiter = {
            let sched = Arc::clone(&sched);
            thread::spawn(move || {
                let start = Instant::now();
                let claimed = sched.claim(SchedulingPolicy::Fcfs).unwrap();
                (claimed.is_none(), start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        sched.retire(1, SliceOutcome::Completed);
        let (none, waited) = waiter.join().unwrap();
        assert!(none);
        assert!(waited < Duration::from_secs(5));
    }

    #[test]
    fn test_shutdown_stops_claims() {
        let sched = Scheduler::default();
        sched.admit(pcb(1, 1)).unwrap();
        sched.shutdown();
        assert!(sched.is_shut_down());
        assert!(sched.claim(SchedulingPolicy::Fcfs).unwrap().is_none());
        assert_eq!(sched.ready_queue().len(), 1);
    }
}
