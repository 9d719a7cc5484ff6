//! Workload sources: JSON files and the built-in demo set.

pub mod json;

pub use json::{demo_workload, load_workload, PidAllocator, ProcessSpec, WorkloadSpec};
