//! Common error types for the Montree engine

use thiserror::Error;

/// Common result type for Montree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Montree crates
///
/// Every error is scoped to a single invocation; nothing here is fatal
/// to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input; the message names the offending value and the allowed set
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested learner/work/scope does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique-key violation that could not be absorbed as a skip
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal invariant violation (corrupt row, unparseable guid)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Reconciliation produced no assignments for a plan
    ///
    /// An all-failed batch almost always means a systemic roster/name
    /// mismatch, so the per-entry soft failures escalate to this
    /// batch-level error carrying the full match log.
    #[error("Reconciliation for plan {plan_id} produced no assignments ({log_len} entries logged)", log_len = match_log.len())]
    EmptyReconciliation {
        plan_id: String,
        match_log: Vec<MatchLogEntry>,
    },
}

/// One entry of a reconciliation match log
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchLogEntry {
    /// Learner name resolved against the roster; `matched` holds the
    /// roster's canonical spelling.
    Matched { parsed: String, matched: String },
    /// Learner name had no roster match; the entry was skipped.
    NotFound { parsed: String },
}
