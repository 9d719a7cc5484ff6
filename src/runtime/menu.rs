//! Interactive policy selection.

use std::io::BufRead;

use crate::core::{SchedulerError, SchedulingPolicy};

/// Menu shown before a run when no policy is configured.
pub const MENU: &str = "\n\t ----------{ Choose a scheduling policy }----------\n\
\n\t\t [1] = FCFS\
\n\t\t [2] = Shortest Remaining Quantum First\
\n\t\t [3] = Priority\
\n\t\t [>] = ";

/// Read one menu choice from `input`.
///
/// # Errors
///
/// - `SchedulerError::InvalidPolicySelection` for empty, non-numeric or
///   out-of-range input
/// - `SchedulerError::UnsupportedPolicy` for the priority entry
pub fn read_policy_selection(mut input: impl BufRead) -> Result<SchedulingPolicy, SchedulerError> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| SchedulerError::InvalidPolicySelection(e.to_string()))?;
    let trimmed = line.trim();
    let choice: i64 = trimmed
        .parse()
        .map_err(|_| SchedulerError::InvalidPolicySelection(trimmed.to_string()))?;
    SchedulingPolicy::from_menu(choice)
}
