//! Wire a [`SimulatorConfig`] into a scheduler, audit sink and orchestrator.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{AuditBackendConfig, AuditConfig, SimulatorConfig};
use crate::core::{
    Alu, AuditSink, ExecutionUnit, InMemoryAuditSink, Orchestrator, Scheduler, SchedulerError,
    SchedulingPolicy, SharedAuditSink,
};
use crate::infra::FileAuditSink;

/// Build the shared scheduler state from configuration.
///
/// # Errors
///
/// `SchedulerError::InvalidConfig` if the configuration does not validate.
pub fn build_scheduler(cfg: &SimulatorConfig) -> Result<Arc<Scheduler>, SchedulerError> {
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;
    Ok(Arc::new(
        Scheduler::new(cfg.idle_wait())
            .with_abort_on_missing_descriptor(cfg.abort_on_missing_descriptor),
    ))
}

/// Build the audit sink selected by `cfg`; `None` when auditing is disabled.
#[must_use]
pub fn build_audit_sink(cfg: &AuditConfig) -> Option<SharedAuditSink> {
    let sink: Box<dyn AuditSink> = match cfg.backend {
        AuditBackendConfig::File => Box::new(FileAuditSink::new(&cfg.path)),
        AuditBackendConfig::InMemory => Box::new(InMemoryAuditSink::new(cfg.max_records)),
        AuditBackendConfig::Disabled => return None,
    };
    Some(Arc::new(Mutex::new(sink)))
}

/// Build an orchestrator over `scheduler` running the reference [`Alu`].
///
/// `policy` overrides the configured one.
///
/// # Errors
///
/// `SchedulerError::InvalidConfig` if no policy is given or configured, or the
/// configuration does not validate.
pub fn build_orchestrator(
    cfg: &SimulatorConfig,
    scheduler: Arc<Scheduler>,
    policy: Option<SchedulingPolicy>,
) -> Result<Orchestrator, SchedulerError> {
    build_orchestrator_with_unit(cfg, scheduler, policy, Arc::new(Alu))
}

/// As [`build_orchestrator`] with a caller-provided execution unit.
///
/// # Errors
///
/// See [`build_orchestrator`].
pub fn build_orchestrator_with_unit(
    cfg: &SimulatorConfig,
    scheduler: Arc<Scheduler>,
    policy: Option<SchedulingPolicy>,
    unit: Arc<dyn ExecutionUnit>,
) -> Result<Orchestrator, SchedulerError> {
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;
    let policy = policy
        .or(cfg.policy)
        .ok_or_else(|| SchedulerError::InvalidConfig("no scheduling policy selected".into()))?;

    Ok(Orchestrator::new(cfg.resolved_cores(), policy, scheduler, unit)
        .with_audit(build_audit_sink(&cfg.audit))
        .with_stack_size(cfg.thread_stack_size))
}
