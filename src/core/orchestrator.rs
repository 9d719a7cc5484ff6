//! Orchestrator: one dispatcher thread per simulated core, joined at the end.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::core::dispatcher::{Dispatcher, DispatcherReport, SharedAuditSink};
use crate::core::executor::ExecutionUnit;
use crate::core::stats::SchedulerStats;
use crate::core::{Scheduler, SchedulerError, SchedulingPolicy};
use crate::util::clock::Stopwatch;

/// Outcome of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifier attached to this run's log lines.
    pub run_id: String,
    /// Policy every core used.
    pub policy: SchedulingPolicy,
    /// Number of dispatcher threads.
    pub num_cores: usize,
    /// Wall-clock duration from first spawn to last join.
    pub elapsed: Duration,
    /// Scheduler counters at the end of the run.
    pub stats: SchedulerStats,
    /// Per-core reports ordered by core id.
    pub cores: Vec<DispatcherReport>,
}

impl RunReport {
    /// Elapsed wall-clock time in nanoseconds.
    #[must_use]
    pub const fn elapsed_nanos(&self) -> u128 {
        self.elapsed.as_nanos()
    }
}

/// Spawns `num_cores` dispatchers over a shared scheduler and waits for them.
pub struct Orchestrator {
    num_cores: usize,
    policy: SchedulingPolicy,
    scheduler: Arc<Scheduler>,
    unit: Arc<dyn ExecutionUnit>,
    audit: Option<SharedAuditSink>,
    stack_size: Option<usize>,
}

impl Orchestrator {
    /// Create an orchestrator.
    pub fn new(
        num_cores: usize,
        policy: SchedulingPolicy,
        scheduler: Arc<Scheduler>,
        unit: Arc<dyn ExecutionUnit>,
    ) -> Self {
        Self {
            num_cores,
            policy,
            scheduler,
            unit,
            audit: None,
            stack_size: None,
        }
    }

    /// Attach an audit sink shared by all cores.
    #[must_use]
    pub fn with_audit(mut self, audit: Option<SharedAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Stack size for each dispatcher thread.
    #[must_use]
    pub fn with_stack_size(mut self, stack_size: Option<usize>) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Shared scheduler state.
    #[must_use]
    pub const fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Configured policy.
    #[must_use]
    pub const fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    /// Configured core count.
    #[must_use]
    pub const fn num_cores(&self) -> usize {
        self.num_cores
    }

    /// Run every dispatcher to completion.
    ///
    /// A panic inside a slice is contained by its dispatcher and shows up as
    /// that core's [`DispatcherReport::error`].
    ///
    /// # Errors
    ///
    /// `SchedulerError::DispatcherSpawn` if a thread cannot be created (the
    /// scheduler is shut down and already-started cores are joined first) or a
    /// dispatcher thread died outside a slice.
    pub fn run(&self) -> Result<RunReport, SchedulerError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "run",
            run_id = %run_id,
            policy = %self.policy,
            cores = self.num_cores
        );
        let _entered = span.enter();

        info!(live = self.scheduler.live_processes(), "starting dispatchers");
        let stopwatch = Stopwatch::start();
        let (report_tx, report_rx) = crossbeam_channel::unbounded::<DispatcherReport>();
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(self.num_cores);

        for core_id in 0..self.num_cores {
            let dispatcher = Dispatcher::new(
                core_id,
                self.policy,
                Arc::clone(&self.scheduler),
                Arc::clone(&self.unit),
            )
            .with_audit(self.audit.clone());
            let report_tx = report_tx.clone();

            let mut builder = thread::Builder::new().name(format!("cpu-core-{core_id}"));
            if let Some(stack_size) = self.stack_size {
                builder = builder.stack_size(stack_size);
            }

            match builder.spawn(move || {
                let report = dispatcher.run();
                let _ = report_tx.send(report);
            }) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!(core_id, error = %e, "failed to spawn dispatcher");
                    self.scheduler.shutdown();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(SchedulerError::DispatcherSpawn(format!(
                        "core {core_id}: {e}"
                    )));
                }
            }
        }
        drop(report_tx);

        // Ends once every dispatcher has sent its report or died.
        let mut cores: Vec<DispatcherReport> = report_rx.iter().collect();
        let mut panicked = 0usize;
        for handle in handles {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        let elapsed = stopwatch.elapsed();

        if panicked > 0 {
            warn!(panicked, "dispatcher threads panicked");
            return Err(SchedulerError::DispatcherSpawn(format!(
                "{panicked} dispatcher thread(s) panicked"
            )));
        }

        cores.sort_by_key(|r| r.core_id);
        let stats = self.scheduler.stats();
        info!(
            elapsed_ns = elapsed.as_nanos(),
            slices = stats.slices,
            completed = stats.completed,
            blocked = stats.blocked,
            "run finished"
        );

        Ok(RunReport {
            run_id,
            policy: self.policy,
            num_cores: self.num_cores,
            elapsed,
            stats,
            cores,
        })
    }
}
