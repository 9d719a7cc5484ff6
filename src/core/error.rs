//! Error types for scheduler and execution-unit operations.

use thiserror::Error;

use crate::core::process::Pid;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A descriptor with this id is already held by the memory pool.
    #[error("duplicate process id: {0}")]
    DuplicateProcess(Pid),
    /// The ready queue handed out an id the memory pool no longer holds.
    #[error("descriptor missing from memory pool: {0}")]
    MissingDescriptor(Pid),
    /// Menu value outside the known policy range.
    #[error("invalid policy selection: {0}")]
    InvalidPolicySelection(String),
    /// Policy is declared but has no selection algorithm.
    #[error("unsupported scheduling policy: {0}")]
    UnsupportedPolicy(String),
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Workload file could not be read or parsed.
    #[error("workload error: {0}")]
    Workload(String),
    /// A dispatcher thread could not be created or died unexpectedly.
    #[error("dispatcher error: {0}")]
    DispatcherSpawn(String),
}

/// Faults raised by an execution unit while interpreting one instruction.
///
/// Any fault moves the running process to `BLOCKED`; it is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFault {
    /// Instruction was issued with no quantum left.
    #[error("quantum exhausted")]
    QuantumExhausted,
    /// Register operand outside the register file.
    #[error("invalid register r{0}")]
    InvalidRegister(usize),
    /// Divisor register held zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Arithmetic result did not fit in a register.
    #[error("arithmetic overflow")]
    Overflow,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
