//! Progress status lattice
//!
//! Single canonical encoding of the four-state progress lattice. Legacy
//! representations (numeric levels, the `completed` synonym) are adapted
//! here, at the boundary, and never propagate through the engine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Allowed status strings, in lattice order
pub const STATUS_NAMES: [&str; 4] = ["not_started", "presented", "practicing", "mastered"];

/// Per-learner, per-work progress status
///
/// Total order: `not_started < presented < practicing < mastered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    Presented,
    Practicing,
    Mastered,
}

impl ProgressStatus {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::Presented => "presented",
            ProgressStatus::Practicing => "practicing",
            ProgressStatus::Mastered => "mastered",
        }
    }

    /// Numeric rank for legacy storage columns
    pub fn rank(&self) -> i64 {
        match self {
            ProgressStatus::NotStarted => 0,
            ProgressStatus::Presented => 1,
            ProgressStatus::Practicing => 2,
            ProgressStatus::Mastered => 3,
        }
    }

    /// Parse a status string, normalizing the legacy `completed` synonym
    /// to `mastered` before any comparison.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "not_started" => Ok(ProgressStatus::NotStarted),
            "presented" => Ok(ProgressStatus::Presented),
            "practicing" => Ok(ProgressStatus::Practicing),
            "mastered" | "completed" => Ok(ProgressStatus::Mastered),
            other => Err(Error::Validation(format!(
                "invalid status '{}'; allowed: {}",
                other,
                STATUS_NAMES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
