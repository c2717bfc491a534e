//! Database row models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ProgressStatus;

/// One prerequisite edge in the catalog graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteEdge {
    /// Catalog work the edge points to
    pub work_id: Uuid,
    /// Required edges gate recommendation; optional edges are advisory
    pub required: bool,
}

/// A canonical catalog work
///
/// Immutable once published. `name` is the stable natural key used to
/// re-link scoped instances after reseeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogWork {
    pub guid: Uuid,
    pub name: String,
    pub area: String,
    pub category: String,
    pub sequence: i64,
    pub age_range: String,
    pub prerequisites: Vec<PrerequisiteEdge>,
}

/// A per-scope copy of a catalog work with instance-local customization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopedWork {
    pub guid: Uuid,
    pub scope_id: String,
    pub work_id: Uuid,
    pub name: String,
    pub area: String,
    pub category: String,
    pub sequence: i64,
    pub age_range: String,
    pub is_active: bool,
    pub materials_owned: bool,
    pub notes: Option<String>,
}

/// A learner in a scope's roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learner {
    pub guid: Uuid,
    pub scope_id: String,
    pub name: String,
    pub birth_date: NaiveDate,
}

/// Progress lattice value for one learner on one work instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub learner_id: Uuid,
    pub work_id: Uuid,
    pub status: ProgressStatus,
    pub presented_at: Option<DateTime<Utc>>,
    pub mastered_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// One reconciled assignment row for a plan version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub guid: Uuid,
    pub plan_id: String,
    pub learner_id: Uuid,
    /// Scoped work instance when the upstream parser matched one
    pub work_id: Option<Uuid>,
    /// Raw work name kept for later manual linking when unmatched
    pub raw_work_name: Option<String>,
    pub area: String,
}
