//! # Montree Engine
//!
//! Curriculum progression and recommendation engine:
//! - Catalog of works and their prerequisite graph
//! - Catalog instantiation (seeding) into per-scope working copies
//! - Per-learner progress ledger over the four-state status lattice
//! - Age-tier-aware next-work recommendation and per-area aggregation
//! - Weekly plan reconciliation into durable assignment rows
//!
//! Every operation is a plain async function over a `SqlitePool` plus
//! explicit `scope_id`/`learner_id`/`plan_id` parameters. There is no
//! session state and no process-wide default scope. Concurrency
//! correctness rests on the storage layer's unique keys: seeding and
//! the ledger upsert are constraint-checked per row, and reconciliation
//! replaces a plan's assignment set inside a single transaction.

pub mod catalog;
pub mod ledger;
pub mod recommend;
pub mod reconcile;
pub mod roster;
pub mod seed;
pub mod summary;

pub use catalog::{create_work, get_work_by_name, list_works, NewWork};
pub use ledger::{get_record, list_records_for_learner, set_status};
pub use recommend::{recommend, RecommendedWork};
pub use reconcile::{list_assignments, reconcile, DraftEntry, DraftWork, ReconcileOutcome};
pub use roster::{create_learner, get_learner, list_learners};
pub use seed::{list_instances, seed, update_instance, InstanceChanges, SeedOutcome};
pub use summary::{summarize, AreaSummary, ProgressSummary};

use montree_common::{Error, Result};
use uuid::Uuid;

/// Parse a guid column read back from the store
///
/// Row guids are written by this crate, so a parse failure means a
/// corrupt row rather than bad input.
pub(crate) fn parse_guid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("corrupt guid '{}': {}", raw, e)))
}
