//! Progress ledger
//!
//! One record per (learner, work instance), created lazily on the first
//! status write. The write path is a single upsert against the
//! `(learner_id, work_id)` primary key: concurrent writers for the same
//! pair produce a last-write-wins outcome with no engine-side locking.

use chrono::{DateTime, Utc};
use montree_common::db::models::ProgressRecord;
use montree_common::{time, Error, ProgressStatus, Result};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::parse_guid;

/// Upsert a learner's status on one work instance
///
/// Accepts the legacy `completed` synonym for `mastered`. Timestamp
/// handling follows the status lattice:
/// - `presented` re-stamps `presented_at` on every write ("last
///   touched") and clears `mastered_at`;
/// - `practicing` keeps an existing `presented_at` and clears
///   `mastered_at`;
/// - `mastered` re-stamps `mastered_at`;
/// - `practicing` and `mastered` stamp `presented_at` if the record
///   never passed through `presented`, keeping the timestamp non-null
///   whenever the status is at or past `presented`;
/// - `not_started` clears both.
///
/// Moving backward clears the now-inapplicable later timestamp without
/// erasing the earlier one; re-advancing later stamps a fresh time.
pub async fn set_status(
    pool: &SqlitePool,
    learner_id: Uuid,
    work_ref: Uuid,
    status_raw: &str,
) -> Result<ProgressRecord> {
    let status = ProgressStatus::parse(status_raw)?;

    let learner_scope: String =
        sqlx::query_scalar("SELECT scope_id FROM learners WHERE guid = ?")
            .bind(learner_id.to_string())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("learner {}", learner_id)))?;

    let work_scope: String =
        sqlx::query_scalar("SELECT scope_id FROM scoped_works WHERE guid = ?")
            .bind(work_ref.to_string())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("work instance {}", work_ref)))?;

    if learner_scope != work_scope {
        return Err(Error::NotFound(format!(
            "work instance {} is not in learner {}'s scope",
            work_ref, learner_id
        )));
    }

    let prior_presented_at: Option<DateTime<Utc>> = sqlx::query_scalar(
        "SELECT presented_at FROM progress_records WHERE learner_id = ? AND work_id = ?",
    )
    .bind(learner_id.to_string())
    .bind(work_ref.to_string())
    .fetch_optional(pool)
    .await?
    .flatten();

    let now = time::now();
    let (presented_at, mastered_at) = match status {
        ProgressStatus::NotStarted => (None, None),
        ProgressStatus::Presented => (Some(now), None),
        ProgressStatus::Practicing => (prior_presented_at.or(Some(now)), None),
        ProgressStatus::Mastered => (prior_presented_at.or(Some(now)), Some(now)),
    };

    sqlx::query(
        r#"
        INSERT INTO progress_records (learner_id, work_id, status, presented_at, mastered_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (learner_id, work_id) DO UPDATE SET
            status = excluded.status,
            presented_at = excluded.presented_at,
            mastered_at = excluded.mastered_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(learner_id.to_string())
    .bind(work_ref.to_string())
    .bind(status.as_str())
    .bind(presented_at)
    .bind(mastered_at)
    .bind(now)
    .execute(pool)
    .await?;

    info!(learner = %learner_id, work = %work_ref, status = %status, "recorded progress");

    Ok(ProgressRecord {
        learner_id,
        work_id: work_ref,
        status,
        presented_at,
        mastered_at,
        updated_at: now,
    })
}

/// Fetch one progress record, if a status was ever written
pub async fn get_record(
    pool: &SqlitePool,
    learner_id: Uuid,
    work_ref: Uuid,
) -> Result<Option<ProgressRecord>> {
    let row = sqlx::query(
        r#"
        SELECT learner_id, work_id, status, presented_at, mastered_at, updated_at
        FROM progress_records
        WHERE learner_id = ? AND work_id = ?
        "#,
    )
    .bind(learner_id.to_string())
    .bind(work_ref.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(record_from_row).transpose()
}

/// All progress records for one learner
pub async fn list_records_for_learner(
    pool: &SqlitePool,
    learner_id: Uuid,
) -> Result<Vec<ProgressRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT learner_id, work_id, status, presented_at, mastered_at, updated_at
        FROM progress_records
        WHERE learner_id = ?
        "#,
    )
    .bind(learner_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(record_from_row).collect()
}

fn record_from_row(row: sqlx::sqlite::SqliteRow) -> Result<ProgressRecord> {
    Ok(ProgressRecord {
        learner_id: parse_guid(&row.get::<String, _>("learner_id"))?,
        work_id: parse_guid(&row.get::<String, _>("work_id"))?,
        status: ProgressStatus::parse(&row.get::<String, _>("status"))?,
        presented_at: row.get("presented_at"),
        mastered_at: row.get("mastered_at"),
        updated_at: row.get("updated_at"),
    })
}
