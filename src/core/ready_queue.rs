//! Ready queue: insertion-ordered ring of scheduling entries behind one mutex.
//!
//! The queue mirrors only the fields a policy needs (id, quantum, priority);
//! full descriptors live in the [`MemoryPool`](crate::core::MemoryPool).
//! A condvar paired with the queue mutex lets idle dispatchers sleep until
//! work is inserted or the scheduler shuts down.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::Serialize;

use crate::core::process::Pid;
use crate::core::SchedulingPolicy;

/// Scheduling metadata for one waiting process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadyEntry {
    /// Process identifier.
    pub id: Pid,
    /// Remaining quantum at insertion time.
    pub quantum: u32,
    /// Process priority.
    pub priority: i32,
    /// Insertion sequence number; lower was inserted earlier.
    pub seq: u64,
}

/// Entries guarded by the ready-queue mutex.
#[derive(Debug, Default)]
pub(crate) struct ReadyEntries {
    entries: VecDeque<ReadyEntry>,
    next_seq: u64,
}

impl ReadyEntries {
    pub(crate) fn push(&mut self, id: Pid, quantum: u32, priority: i32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(ReadyEntry {
            id,
            quantum,
            priority,
            seq,
        });
    }

    pub(crate) fn remove_by_id(&mut self, id: Pid) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_next(&mut self, policy: SchedulingPolicy) -> Option<ReadyEntry> {
        let idx = policy.select(&self.entries)?;
        self.entries.remove(idx)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Concurrent ready queue.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    entries: Mutex<ReadyEntries>,
    work_available: Condvar,
}

impl ReadyQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and wake one idle dispatcher. Always accepted.
    pub fn insert(&self, id: Pid, quantum: u32, priority: i32) {
        self.entries.lock().push(id, quantum, priority);
        self.work_available.notify_one();
    }

    /// Remove the entry for `id`. Returns whether one was present.
    pub fn remove_by_id(&self, id: Pid) -> bool {
        self.entries.lock().remove_by_id(id)
    }

    /// Select and remove the next entry under `policy`.
    pub fn next(&self, policy: SchedulingPolicy) -> Option<Pid> {
        self.entries.lock().take_next(policy).map(|e| e.id)
    }

    /// Copy of the current entries in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> ReadySnapshot {
        ReadySnapshot {
            entries: self.entries.lock().entries.iter().copied().collect(),
        }
    }

    /// Number of waiting entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Instant-in-time emptiness check.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lock the entries for a multi-step operation.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ReadyEntries> {
        self.entries.lock()
    }

    /// Sleep on the work condvar, releasing the guard while waiting.
    /// Returns true if the wait timed out.
    pub(crate) fn wait_for_work(
        &self,
        guard: &mut MutexGuard<'_, ReadyEntries>,
        timeout: Duration,
    ) -> bool {
        self.work_available.wait_for(guard, timeout).timed_out()
    }

    pub(crate) fn notify_one(&self) {
        self.work_available.notify_one();
    }

    pub(crate) fn notify_all(&self) {
        self.work_available.notify_all();
    }
}

/// Point-in-time view of the ready queue. Iterating does not touch the queue
/// and can be repeated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadySnapshot {
    entries: Vec<ReadyEntry>,
}

impl ReadySnapshot {
    /// Iterate the captured entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ReadyEntry> {
        self.entries.iter()
    }

    /// Captured ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Number of captured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReadySnapshot {
    type Item = &'a ReadyEntry;
    type IntoIter = std::slice::Iter<'a, ReadyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
