//! Core scheduling abstractions: descriptors, ready queue, memory pool,
//! policies, and the per-core dispatch machinery.

pub mod audit;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod memory_pool;
pub mod orchestrator;
pub mod policy;
pub mod process;
pub mod ready_queue;
pub mod scheduler;
pub mod stats;

pub use audit::{AuditSink, InMemoryAuditSink, SliceOutcome, SliceRecord};
pub use dispatcher::{Dispatcher, DispatcherReport, SharedAuditSink};
pub use error::{AppResult, ExecutionFault, SchedulerError};
pub use executor::{Alu, ExecutionUnit};
pub use memory_pool::MemoryPool;
pub use orchestrator::{Orchestrator, RunReport};
pub use policy::SchedulingPolicy;
pub use process::{Instruction, Pid, ProcessDescriptor, ProcessState, Registers, REGISTER_COUNT};
pub use ready_queue::{ReadyEntry, ReadyQueue, ReadySnapshot};
pub use scheduler::{Scheduler, DEFAULT_IDLE_WAIT};
pub use stats::SchedulerStats;
