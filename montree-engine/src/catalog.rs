//! Catalog works and their prerequisite graph
//!
//! Reference data only: works are immutable once published, so there is
//! no update path. The `name` column is the stable natural key that
//! survives reseeding.

use montree_common::db::models::{CatalogWork, PrerequisiteEdge};
use montree_common::{Area, AgeTier, Error, Result};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::parse_guid;

/// Input for publishing one catalog work
#[derive(Debug, Clone)]
pub struct NewWork {
    pub name: String,
    pub area: Area,
    pub category: String,
    /// Orders works within area/category; lower comes first
    pub sequence: i64,
    pub age_range: AgeTier,
    pub prerequisites: Vec<PrerequisiteEdge>,
}

/// Publish a catalog work with its prerequisite edges
///
/// Fails with `Conflict` if a work with the same name already exists
/// and with `Validation` if a prerequisite id is unknown or the
/// sequence is negative.
pub async fn create_work(pool: &SqlitePool, work: NewWork) -> Result<CatalogWork> {
    let name = work.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("work name must not be empty".into()));
    }
    if work.sequence < 0 {
        return Err(Error::Validation(format!(
            "work sequence must be >= 0, got {}",
            work.sequence
        )));
    }

    // Prerequisite ids must reference published works
    for edge in &work.prerequisites {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM works WHERE guid = ?)")
            .bind(edge.work_id.to_string())
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(Error::Validation(format!(
                "unknown prerequisite work id: {}",
                edge.work_id
            )));
        }
    }

    let guid = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO works (guid, name, area, category, sequence, age_range)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(name)
    .bind(work.area.as_str())
    .bind(work.category.trim())
    .bind(work.sequence)
    .bind(work.age_range.as_str())
    .execute(&mut *tx)
    .await;

    if let Err(sqlx::Error::Database(db_err)) = &inserted {
        if db_err.is_unique_violation() {
            return Err(Error::Conflict(format!(
                "a catalog work named '{}' already exists",
                name
            )));
        }
    }
    inserted?;

    for edge in &work.prerequisites {
        sqlx::query(
            r#"
            INSERT INTO work_prerequisites (work_id, prerequisite_id, required)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(guid.to_string())
        .bind(edge.work_id.to_string())
        .bind(edge.required)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(work = name, area = %work.area, "published catalog work");

    Ok(CatalogWork {
        guid,
        name: name.to_string(),
        area: work.area.as_str().to_string(),
        category: work.category.trim().to_string(),
        sequence: work.sequence,
        age_range: work.age_range.as_str().to_string(),
        prerequisites: work.prerequisites,
    })
}

/// List the full catalog with prerequisite edges attached
///
/// Ordered by area, then sequence, with catalog insertion order
/// breaking ties.
pub async fn list_works(pool: &SqlitePool) -> Result<Vec<CatalogWork>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, name, area, category, sequence, age_range
        FROM works
        ORDER BY area, sequence, rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    let edge_rows = sqlx::query(
        "SELECT work_id, prerequisite_id, required FROM work_prerequisites",
    )
    .fetch_all(pool)
    .await?;

    let mut edges: HashMap<String, Vec<PrerequisiteEdge>> = HashMap::new();
    for row in edge_rows {
        let work_id: String = row.get("work_id");
        edges.entry(work_id).or_default().push(PrerequisiteEdge {
            work_id: parse_guid(&row.get::<String, _>("prerequisite_id"))?,
            required: row.get("required"),
        });
    }

    let mut works = Vec::with_capacity(rows.len());
    for row in rows {
        let guid_raw: String = row.get("guid");
        works.push(CatalogWork {
            guid: parse_guid(&guid_raw)?,
            name: row.get("name"),
            area: row.get("area"),
            category: row.get("category"),
            sequence: row.get("sequence"),
            age_range: row.get("age_range"),
            prerequisites: edges.remove(&guid_raw).unwrap_or_default(),
        });
    }

    Ok(works)
}

/// Look up a catalog work by its natural key
pub async fn get_work_by_name(pool: &SqlitePool, name: &str) -> Result<CatalogWork> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, area, category, sequence, age_range
        FROM works
        WHERE name = ?
        "#,
    )
    .bind(name.trim())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("catalog work '{}'", name)))?;

    let guid_raw: String = row.get("guid");
    let edge_rows = sqlx::query(
        "SELECT prerequisite_id, required FROM work_prerequisites WHERE work_id = ?",
    )
    .bind(&guid_raw)
    .fetch_all(pool)
    .await?;

    let mut prerequisites = Vec::with_capacity(edge_rows.len());
    for edge in edge_rows {
        prerequisites.push(PrerequisiteEdge {
            work_id: parse_guid(&edge.get::<String, _>("prerequisite_id"))?,
            required: edge.get("required"),
        });
    }

    Ok(CatalogWork {
        guid: parse_guid(&guid_raw)?,
        name: row.get("name"),
        area: row.get("area"),
        category: row.get("category"),
        sequence: row.get("sequence"),
        age_range: row.get("age_range"),
        prerequisites,
    })
}
