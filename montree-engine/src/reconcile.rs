//! Weekly plan reconciliation
//!
//! Turns an externally parsed draft assignment list (free-text learner
//! and work names) into durable assignment rows. Per-entry failures are
//! soft: an unresolved learner is logged and skipped. The one
//! batch-fatal case is a reconciliation that produces nothing at all,
//! which almost always means the roster and the plan disagree
//! systematically and must surface instead of silently emptying the
//! plan.

use montree_common::area::normalize_assignment_area;
use montree_common::db::models::{Assignment, Learner};
use montree_common::error::MatchLogEntry;
use montree_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::parse_guid;

/// One work from a draft entry, as produced by the upstream parser
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DraftWork {
    /// Free-text area label; normalized through the synonym table
    pub area_raw: String,
    pub work_name: String,
    /// Scoped instance ref when the upstream parser matched one
    pub matched_work_ref: Option<Uuid>,
}

/// One learner's draft assignments
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DraftEntry {
    pub learner_name: String,
    pub works: Vec<DraftWork>,
}

/// Outcome of one reconcile call
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReconcileOutcome {
    pub assignments_created: u64,
    pub match_log: Vec<MatchLogEntry>,
}

/// Reconcile a draft plan against the roster into assignment rows
///
/// Learner names resolve by case-insensitive exact match against the
/// roster; unresolved entries are recorded as `NOT_FOUND` in the match
/// log and skipped without aborting the batch. The full assignment set
/// for `plan_id` is replaced atomically (delete + insert in one
/// transaction), so readers never observe an empty or mixed set
/// mid-update. Zero produced assignments roll the whole call back and
/// return `EmptyReconciliation` carrying the match log; any prior
/// assignment set for the plan is left intact.
pub async fn reconcile(
    pool: &SqlitePool,
    plan_id: &str,
    draft_entries: &[DraftEntry],
    roster: &[Learner],
) -> Result<ReconcileOutcome> {
    let plan_id = plan_id.trim();
    if plan_id.is_empty() {
        return Err(Error::Validation("plan_id must not be empty".into()));
    }

    let mut match_log = Vec::with_capacity(draft_entries.len());
    let mut rows: Vec<Assignment> = Vec::new();

    for entry in draft_entries {
        let parsed = entry.learner_name.trim();
        let resolved = roster
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(parsed));

        let learner = match resolved {
            Some(learner) => {
                match_log.push(MatchLogEntry::Matched {
                    parsed: parsed.to_string(),
                    matched: learner.name.clone(),
                });
                learner
            }
            None => {
                warn!(plan = plan_id, learner = parsed, "no roster match, skipping entry");
                match_log.push(MatchLogEntry::NotFound {
                    parsed: parsed.to_string(),
                });
                continue;
            }
        };

        for work in &entry.works {
            let work_name = work.work_name.trim();

            // A work ref from the upstream parser must name an
            // instance in this learner's scope; a dangling or
            // cross-scope ref degrades to the raw name for later
            // manual linking.
            let work_id = match work.matched_work_ref {
                Some(work_ref) => {
                    let exists: bool = sqlx::query_scalar(
                        "SELECT EXISTS(SELECT 1 FROM scoped_works WHERE guid = ? AND scope_id = ?)",
                    )
                    .bind(work_ref.to_string())
                    .bind(&learner.scope_id)
                    .fetch_one(pool)
                    .await?;
                    if exists {
                        Some(work_ref)
                    } else {
                        warn!(plan = plan_id, work = %work_ref, "matched work ref not in learner's scope, keeping raw name");
                        None
                    }
                }
                None => None,
            };

            if work_id.is_none() && work_name.is_empty() {
                warn!(plan = plan_id, learner = %learner.name, "draft work has neither ref nor name, skipping");
                continue;
            }

            rows.push(Assignment {
                guid: Uuid::new_v4(),
                plan_id: plan_id.to_string(),
                learner_id: learner.guid,
                work_id,
                raw_work_name: if work_name.is_empty() {
                    None
                } else {
                    Some(work_name.to_string())
                },
                area: normalize_assignment_area(&work.area_raw),
            });
        }
    }

    if rows.is_empty() {
        return Err(Error::EmptyReconciliation {
            plan_id: plan_id.to_string(),
            match_log,
        });
    }

    // Atomic replacement: delete + insert are one unit of work, so a
    // concurrent reader sees either the old set or the new one.
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM assignments WHERE plan_id = ?")
        .bind(plan_id)
        .execute(&mut *tx)
        .await?;

    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO assignments (guid, plan_id, learner_id, work_id, raw_work_name, area)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.guid.to_string())
        .bind(&row.plan_id)
        .bind(row.learner_id.to_string())
        .bind(row.work_id.map(|id| id.to_string()))
        .bind(&row.raw_work_name)
        .bind(&row.area)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        plan = plan_id,
        created = rows.len(),
        entries = draft_entries.len(),
        "reconciled plan"
    );

    Ok(ReconcileOutcome {
        assignments_created: rows.len() as u64,
        match_log,
    })
}

/// Read the current assignment set for a plan
pub async fn list_assignments(pool: &SqlitePool, plan_id: &str) -> Result<Vec<Assignment>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, plan_id, learner_id, work_id, raw_work_name, area
        FROM assignments
        WHERE plan_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let work_id: Option<String> = row.get("work_id");
            Ok(Assignment {
                guid: parse_guid(&row.get::<String, _>("guid"))?,
                plan_id: row.get("plan_id"),
                learner_id: parse_guid(&row.get::<String, _>("learner_id"))?,
                work_id: work_id.as_deref().map(parse_guid).transpose()?,
                raw_work_name: row.get("raw_work_name"),
                area: row.get("area"),
            })
        })
        .collect()
}
