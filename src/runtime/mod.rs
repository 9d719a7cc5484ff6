//! Runtime adapters: interactive menu, async facade and API surface.

pub mod api;
pub mod menu;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_runner;

pub use api::{health, submit_process, Health, ProcessSubmission, RunSummary, SubmissionResponse};
pub use menu::{read_policy_selection, MENU};
#[cfg(feature = "tokio-runtime")]
pub use tokio_runner::run_async;
