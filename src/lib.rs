//! # Prometheus CPU Scheduler
//!
//! A preemptive multi-core process scheduler simulator.
//!
//! Simulated processes are admitted into a shared memory pool and ready
//! queue. One dispatcher thread per simulated core claims the next process
//! under the active [`core::SchedulingPolicy`], runs its instructions through
//! an [`core::ExecutionUnit`] until the quantum runs out, the program ends or
//! the unit faults, and then re-queues or retires it. Every slice produces an
//! audit record.
//!
//! ## Key Features
//!
//! - **Policies**: first come first served and shortest remaining quantum first
//! - **Exclusive claims**: a process is owned by at most one core at a time
//! - **Preemption**: processes resume at the exact instruction they stopped at
//! - **Audit**: per-slice text blocks appended to a file, or kept in memory
//! - **Statistics**: run-wide atomic counters and per-core reports
//!
//! ```rust
//! use std::sync::Arc;
//! use prometheus_cpu_scheduler::core::{
//!     Alu, Instruction, Orchestrator, ProcessDescriptor, Scheduler, SchedulingPolicy,
//! };
//!
//! let scheduler = Arc::new(Scheduler::default());
//! scheduler
//!     .admit(ProcessDescriptor::new(1, 0, 3, vec![Instruction::Nop; 4]))
//!     .unwrap();
//!
//! let report = Orchestrator::new(2, SchedulingPolicy::Fcfs, Arc::clone(&scheduler), Arc::new(Alu))
//!     .run()
//!     .unwrap();
//! assert_eq!(report.stats.completed, 1);
//! assert_eq!(report.stats.preemptions, 1);
//! ```
//!
//! For complete scenarios, see `tests/dispatch_scenarios_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: descriptors, queues, policies, dispatchers.
pub mod core;
/// Configuration models for the simulator and audit backends.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Infrastructure adapters for audit persistence and workload files.
pub mod infra;
/// Runtime adapters: menu, async facade and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
