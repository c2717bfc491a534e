//! Shared test fixtures
//!
//! Each test gets its own temp-folder database so tests can run in
//! parallel without sharing state.

#![allow(dead_code)]

use chrono::{Months, NaiveDate, Utc};
use montree_common::db::init_database;
use montree_common::db::models::{CatalogWork, Learner, PrerequisiteEdge};
use montree_common::{AgeTier, Area};
use montree_engine::{catalog, roster, NewWork};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// Create a fresh database in a temp folder
///
/// The TempDir must stay alive for the duration of the test.
pub async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let pool = init_database(&dir.path().join("montree.db"))
        .await
        .expect("should initialize database");
    (dir, pool)
}

/// Birth date that makes a learner exactly `age` whole years old today
/// (two months past the birthday, away from any boundary)
pub fn birth_date_for_age(age: u32) -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(12 * age + 2))
        .expect("should compute birth date")
}

/// Publish one catalog work
pub async fn add_work(
    pool: &SqlitePool,
    name: &str,
    area: Area,
    sequence: i64,
    age_range: AgeTier,
    prerequisites: &[(Uuid, bool)],
) -> CatalogWork {
    catalog::create_work(
        pool,
        NewWork {
            name: name.to_string(),
            area,
            category: "general".to_string(),
            sequence,
            age_range,
            prerequisites: prerequisites
                .iter()
                .map(|&(work_id, required)| PrerequisiteEdge { work_id, required })
                .collect(),
        },
    )
    .await
    .expect("should create catalog work")
}

/// Add a learner of the given whole-year age
pub async fn add_learner(pool: &SqlitePool, scope_id: &str, name: &str, age: u32) -> Learner {
    roster::create_learner(pool, scope_id, name, birth_date_for_age(age))
        .await
        .expect("should create learner")
}

/// Instance guid for a (scope, catalog work) pair after seeding
pub async fn instance_ref(pool: &SqlitePool, scope_id: &str, work: &CatalogWork) -> Uuid {
    let instances = montree_engine::list_instances(pool, scope_id)
        .await
        .expect("should list instances");
    instances
        .iter()
        .find(|i| i.work_id == work.guid)
        .unwrap_or_else(|| panic!("no instance of '{}' in scope {}", work.name, scope_id))
        .guid
}
