//! Configuration models for the simulator, its audit sink, and timeouts.

pub mod simulator;

pub use simulator::{AuditBackendConfig, AuditConfig, SimulatorConfig, DEFAULT_AUDIT_PATH};
