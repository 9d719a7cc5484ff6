//! Builders to construct scheduler components from configuration.

pub mod scheduler_builder;

pub use scheduler_builder::{
    build_audit_sink, build_orchestrator, build_orchestrator_with_unit, build_scheduler,
};
