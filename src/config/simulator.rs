//! Simulator and audit configuration structures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{SchedulerError, SchedulingPolicy};

/// Where audit records are appended by default.
pub const DEFAULT_AUDIT_PATH: &str = "./output/output.data";

/// Audit backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditBackendConfig {
    /// Append text blocks to a file.
    #[default]
    File,
    /// Keep records in a bounded in-memory buffer.
    InMemory,
    /// Emit nothing.
    Disabled,
}

/// Audit sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Backend selection.
    pub backend: AuditBackendConfig,
    /// Output file for the file backend.
    pub path: PathBuf,
    /// Buffer bound for the in-memory backend.
    pub max_records: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: AuditBackendConfig::File,
            path: PathBuf::from(DEFAULT_AUDIT_PATH),
            max_records: 10_000,
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration values.
    pub fn validate(&self) -> Result<(), String> {
        match self.backend {
            AuditBackendConfig::File if self.path.as_os_str().is_empty() => {
                Err("audit path must not be empty for the file backend".into())
            }
            AuditBackendConfig::InMemory if self.max_records == 0 => {
                Err("max_records must be greater than 0 for the in-memory backend".into())
            }
            _ => Ok(()),
        }
    }
}

/// Root simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Simulated cores; `0` means one per host CPU.
    pub num_cores: usize,
    /// Policy to use; when absent the CLI asks for one.
    pub policy: Option<SchedulingPolicy>,
    /// Upper bound for one idle dispatcher sleep, in milliseconds.
    pub idle_wait_ms: u64,
    /// End a dispatcher's loop when a claimed id has no descriptor.
    pub abort_on_missing_descriptor: bool,
    /// Stack size for dispatcher threads; platform default when absent.
    pub thread_stack_size: Option<usize>,
    /// Audit sink settings.
    pub audit: AuditConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            num_cores: 0,
            policy: None,
            idle_wait_ms: 1,
            abort_on_missing_descriptor: false,
            thread_stack_size: None,
            audit: AuditConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Defaults: one core per host CPU, 1 ms idle wait, file audit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of simulated cores.
    #[must_use]
    pub fn with_num_cores(mut self, num_cores: usize) -> Self {
        self.num_cores = num_cores;
        self
    }

    /// Fix the scheduling policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SchedulingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Set the idle wait bound in milliseconds.
    #[must_use]
    pub fn with_idle_wait_ms(mut self, idle_wait_ms: u64) -> Self {
        self.idle_wait_ms = idle_wait_ms;
        self
    }

    /// Replace the audit settings.
    #[must_use]
    pub fn with_audit(mut self, audit: AuditConfig) -> Self {
        self.audit = audit;
        self
    }

    /// Cores to spawn after resolving `0` to the host CPU count.
    #[must_use]
    pub fn resolved_cores(&self) -> usize {
        if self.num_cores == 0 {
            num_cpus::get().max(1)
        } else {
            self.num_cores
        }
    }

    /// Idle wait as a duration.
    #[must_use]
    pub const fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_cores > 1024 {
            return Err("num_cores must be at most 1024".into());
        }
        if self.idle_wait_ms == 0 {
            return Err("idle_wait_ms must be greater than 0".into());
        }
        if self.thread_stack_size == Some(0) {
            return Err("thread_stack_size must be greater than 0".into());
        }
        self.audit.validate().map_err(|e| format!("audit invalid: {e}"))
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// `SchedulerError::InvalidConfig` on I/O, parse or validation failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| SchedulerError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&input).map_err(SchedulerError::InvalidConfig)
    }
}
