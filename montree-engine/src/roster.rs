//! Roster access: the learners the engine tracks
//!
//! Age is derived from `birth_date` on demand and never stored.

use chrono::NaiveDate;
use montree_common::db::models::Learner;
use montree_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::parse_guid;

/// Add a learner to a scope's roster
pub async fn create_learner(
    pool: &SqlitePool,
    scope_id: &str,
    name: &str,
    birth_date: NaiveDate,
) -> Result<Learner> {
    let scope_id = scope_id.trim();
    let name = name.trim();
    if scope_id.is_empty() {
        return Err(Error::Validation("scope_id must not be empty".into()));
    }
    if name.is_empty() {
        return Err(Error::Validation("learner name must not be empty".into()));
    }

    let guid = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO learners (guid, scope_id, name, birth_date) VALUES (?, ?, ?, ?)",
    )
    .bind(guid.to_string())
    .bind(scope_id)
    .bind(name)
    .bind(birth_date)
    .execute(pool)
    .await?;

    info!(scope = scope_id, learner = name, "created learner");

    Ok(Learner {
        guid,
        scope_id: scope_id.to_string(),
        name: name.to_string(),
        birth_date,
    })
}

/// Fetch one learner by id
pub async fn get_learner(pool: &SqlitePool, learner_id: Uuid) -> Result<Learner> {
    let row = sqlx::query("SELECT guid, scope_id, name, birth_date FROM learners WHERE guid = ?")
        .bind(learner_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("learner {}", learner_id)))?;

    Ok(Learner {
        guid: parse_guid(&row.get::<String, _>("guid"))?,
        scope_id: row.get("scope_id"),
        name: row.get("name"),
        birth_date: row.get("birth_date"),
    })
}

/// List a scope's roster, ordered by name
pub async fn list_learners(pool: &SqlitePool, scope_id: &str) -> Result<Vec<Learner>> {
    let rows = sqlx::query(
        "SELECT guid, scope_id, name, birth_date FROM learners WHERE scope_id = ? ORDER BY name",
    )
    .bind(scope_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(Learner {
                guid: parse_guid(&row.get::<String, _>("guid"))?,
                scope_id: row.get("scope_id"),
                name: row.get("name"),
                birth_date: row.get("birth_date"),
            })
        })
        .collect()
}
