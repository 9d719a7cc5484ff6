//! Memory pool: keyed store of full process descriptors.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::core::process::{Pid, ProcessDescriptor};
use crate::core::SchedulerError;

/// Concurrent store of descriptors waiting for, or returning from, service.
///
/// Each id appears at most once. A descriptor leaves the pool only through
/// [`MemoryPool::take_by_id`], so at most one caller can win it.
#[derive(Debug, Default)]
pub struct MemoryPool {
    descriptors: Mutex<HashMap<Pid, ProcessDescriptor>>,
}

impl MemoryPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor keyed by its id.
    ///
    /// # Errors
    ///
    /// `SchedulerError::DuplicateProcess` if the id is already held; the pool is
    /// left unchanged.
    pub fn insert(&self, descriptor: ProcessDescriptor) -> Result<(), SchedulerError> {
        let mut descriptors = self.descriptors.lock();
        let id = descriptor.id();
        if descriptors.contains_key(&id) {
            return Err(SchedulerError::DuplicateProcess(id));
        }
        descriptors.insert(id, descriptor);
        Ok(())
    }

    /// Remove and return the descriptor for `id`, if still present.
    pub fn take_by_id(&self, id: Pid) -> Option<ProcessDescriptor> {
        self.descriptors.lock().remove(&id)
    }

    /// Whether `id` is currently held.
    #[must_use]
    pub fn contains(&self, id: Pid) -> bool {
        self.descriptors.lock().contains_key(&id)
    }

    /// Number of held descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.lock().len()
    }

    /// Instant-in-time emptiness check. Not a synchronization primitive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::Instruction;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn pcb(id: Pid) -> ProcessDescriptor {
        ProcessDescriptor::new(id, 0, 2, vec![Instruction::Nop])
    }

    #[test]
    fn test_insert_and_take() {
        let pool = MemoryPool::new();
        assert!(pool.is_empty());
        pool.insert(pcb(1)).unwrap();
        assert!(pool.contains(1));

        let taken = pool.take_by_id(1).unwrap();
        assert_eq!(taken.id(), 1);
        assert!(pool.take_by_id(1).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_duplicate_rejected() {
        let pool = MemoryPool::new();
        pool.insert(pcb(5)).unwrap();
        let err = pool.insert(pcb(5)).unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateProcess(5)));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_take_is_at_most_once_across_threads() {
        let pool = Arc::new(MemoryPool::new());
        pool.insert(pcb(9)).unwrap();
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    if pool.take_by_id(9).is_some() {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::Relaxed), 1);
    }
}
