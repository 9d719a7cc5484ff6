//! Infrastructure adapters: audit persistence and workload sources.

pub mod audit;
pub mod workload;

pub use audit::FileAuditSink;
pub use workload::{demo_workload, load_workload, PidAllocator, ProcessSpec, WorkloadSpec};
