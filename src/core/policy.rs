//! Scheduling policies: pure selection over the ready queue's current entries.

use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::ready_queue::ReadyEntry;
use crate::core::SchedulerError;

/// Policy used by dispatchers to pick the next ready process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingPolicy {
    /// First come, first served: earliest insertion wins.
    Fcfs,
    /// Shortest remaining quantum first; ties go to the earliest insertion.
    ShortestRemainingQuantum,
}

impl SchedulingPolicy {
    /// Resolve a numeric menu choice.
    ///
    /// `3` (priority) is a declared menu entry without a selection algorithm
    /// and is rejected rather than aliased to another policy.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::UnsupportedPolicy` for `3`
    /// - `SchedulerError::InvalidPolicySelection` for anything else outside `1..=2`
    pub fn from_menu(choice: i64) -> Result<Self, SchedulerError> {
        match choice {
            1 => Ok(Self::Fcfs),
            2 => Ok(Self::ShortestRemainingQuantum),
            3 => Err(SchedulerError::UnsupportedPolicy("priority".into())),
            other => Err(SchedulerError::InvalidPolicySelection(other.to_string())),
        }
    }

    /// Parse from string representation.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`SchedulingPolicy::from_menu`].
    pub fn parse(s: &str) -> Result<Self, SchedulerError> {
        match s.trim().to_lowercase().as_str() {
            "fcfs" | "fifo" | "1" => Ok(Self::Fcfs),
            "srqf" | "srtf" | "shortest_remaining_quantum" | "2" => {
                Ok(Self::ShortestRemainingQuantum)
            }
            "priority" | "prio" | "3" => Err(SchedulerError::UnsupportedPolicy(s.trim().into())),
            _ => Err(SchedulerError::InvalidPolicySelection(s.trim().into())),
        }
    }

    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::ShortestRemainingQuantum => "srqf",
        }
    }

    /// Index of the entry this policy would service next, if any.
    pub(crate) fn select(self, entries: &VecDeque<ReadyEntry>) -> Option<usize> {
        match self {
            // Entries are kept in insertion order.
            Self::Fcfs => (!entries.is_empty()).then_some(0),
            Self::ShortestRemainingQuantum => entries
                .iter()
                .enumerate()
                .min_by_key(|(_, entry)| (entry.quantum, entry.seq))
                .map(|(idx, _)| idx),
        }
    }
}

impl std::fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchedulingPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchedulingPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
