//! Tests for error types

use prometheus_cpu_scheduler::core::{ExecutionFault, SchedulerError};

#[test]
fn test_duplicate_process_error() {
    let err = SchedulerError::DuplicateProcess(4);
    assert_eq!(format!("{err}"), "duplicate process id: 4");
}

#[test]
fn test_missing_descriptor_error() {
    let err = SchedulerError::MissingDescriptor(9);
    assert_eq!(format!("{err}"), "descriptor missing from memory pool: 9");
}

#[test]
fn test_unsupported_policy_error() {
    let err = SchedulerError::UnsupportedPolicy("priority".to_string());
    assert_eq!(format!("{err}"), "unsupported scheduling policy: priority");
}

#[test]
fn test_execution_fault_display() {
    assert_eq!(ExecutionFault::InvalidRegister(12).to_string(), "invalid register r12");
    assert_eq!(ExecutionFault::DivisionByZero.to_string(), "division by zero");
}

#[test]
fn test_errors_convert_into_anyhow() {
    let result: prometheus_cpu_scheduler::core::AppResult<()> =
        Err(SchedulerError::Workload("bad".into()).into());
    assert_eq!(result.unwrap_err().to_string(), "workload error: bad");
}
