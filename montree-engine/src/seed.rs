//! Catalog instantiation (seeding)
//!
//! Copies the master catalog into a scoped working copy. The existence
//! check is the `UNIQUE(scope_id, work_id)` constraint itself, applied
//! per row with `INSERT OR IGNORE`, so repeated or concurrent seed
//! calls can never double-insert and a retry after partial failure
//! picks up exactly where it left off.

use montree_common::db::models::ScopedWork;
use montree_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::parse_guid;

/// Outcome of one seed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SeedOutcome {
    /// Instances created by this call
    pub created: u64,
    /// Catalog works that were already instantiated and left untouched
    pub skipped: u64,
}

/// Instance-local fields an operator may change
///
/// `None` leaves the field as-is.
#[derive(Debug, Clone, Default)]
pub struct InstanceChanges {
    pub is_active: Option<bool>,
    pub materials_owned: Option<bool>,
    pub notes: Option<String>,
}

/// Instantiate every catalog work for `scope_id` that is not yet present
///
/// Copies `name`/`area`/`category`/`sequence`/`age_range` from the
/// catalog and leaves instance-local fields at their defaults. Existing
/// rows are never touched: `materials_owned`, `notes`, and `is_active`
/// customization survives re-seeding, including incremental seeding
/// after the master catalog gains new works.
pub async fn seed(pool: &SqlitePool, scope_id: &str) -> Result<SeedOutcome> {
    let scope_id = scope_id.trim();
    if scope_id.is_empty() {
        return Err(Error::Validation("scope_id must not be empty".into()));
    }

    let works = sqlx::query("SELECT guid, name, area, category, sequence, age_range FROM works")
        .fetch_all(pool)
        .await?;

    let mut outcome = SeedOutcome {
        created: 0,
        skipped: 0,
    };

    for work in works {
        let work_id: String = work.get("guid");

        // Per-row constraint check: rows_affected is 0 when the
        // (scope_id, work_id) pair already exists.
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO scoped_works
                (guid, scope_id, work_id, name, area, category, sequence, age_range)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(scope_id)
        .bind(&work_id)
        .bind(work.get::<String, _>("name"))
        .bind(work.get::<String, _>("area"))
        .bind(work.get::<String, _>("category"))
        .bind(work.get::<i64, _>("sequence"))
        .bind(work.get::<String, _>("age_range"))
        .execute(pool)
        .await?;

        if result.rows_affected() == 1 {
            outcome.created += 1;
        } else {
            debug!(scope = scope_id, work = %work_id, "already instantiated, skipping");
            outcome.skipped += 1;
        }
    }

    info!(
        scope = scope_id,
        created = outcome.created,
        skipped = outcome.skipped,
        "seeded scope from catalog"
    );

    Ok(outcome)
}

/// List all instances for a scope, sequence order
pub async fn list_instances(pool: &SqlitePool, scope_id: &str) -> Result<Vec<ScopedWork>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, scope_id, work_id, name, area, category, sequence,
               age_range, is_active, materials_owned, notes
        FROM scoped_works
        WHERE scope_id = ?
        ORDER BY sequence, rowid
        "#,
    )
    .bind(scope_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(scoped_work_from_row).collect()
}

/// Update instance-local customization fields for one instance
///
/// These are the fields seeding must never overwrite.
pub async fn update_instance(
    pool: &SqlitePool,
    instance_id: Uuid,
    changes: InstanceChanges,
) -> Result<ScopedWork> {
    let existing = sqlx::query(
        r#"
        SELECT guid, scope_id, work_id, name, area, category, sequence,
               age_range, is_active, materials_owned, notes
        FROM scoped_works
        WHERE guid = ?
        "#,
    )
    .bind(instance_id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("work instance {}", instance_id)))?;

    let mut instance = scoped_work_from_row(existing)?;
    if let Some(is_active) = changes.is_active {
        instance.is_active = is_active;
    }
    if let Some(materials_owned) = changes.materials_owned {
        instance.materials_owned = materials_owned;
    }
    if let Some(notes) = changes.notes {
        instance.notes = Some(notes);
    }

    sqlx::query(
        r#"
        UPDATE scoped_works
        SET is_active = ?, materials_owned = ?, notes = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(instance.is_active)
    .bind(instance.materials_owned)
    .bind(&instance.notes)
    .bind(instance_id.to_string())
    .execute(pool)
    .await?;

    Ok(instance)
}

pub(crate) fn scoped_work_from_row(row: sqlx::sqlite::SqliteRow) -> Result<ScopedWork> {
    Ok(ScopedWork {
        guid: parse_guid(&row.get::<String, _>("guid"))?,
        scope_id: row.get("scope_id"),
        work_id: parse_guid(&row.get::<String, _>("work_id"))?,
        name: row.get("name"),
        area: row.get("area"),
        category: row.get("category"),
        sequence: row.get("sequence"),
        age_range: row.get("age_range"),
        is_active: row.get("is_active"),
        materials_owned: row.get("materials_owned"),
        notes: row.get("notes"),
    })
}
