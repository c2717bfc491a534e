//! Database initialization
//!
//! Creates the database on first run and brings the schema up to date.
//! Every `CREATE TABLE IF NOT EXISTS` is idempotent, so initialization
//! is safe to repeat on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers alongside one writer; reconcile's
    // delete+insert transaction depends on readers seeing a snapshot.
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_works_table(&pool).await?;
    create_work_prerequisites_table(&pool).await?;
    create_scoped_works_table(&pool).await?;
    create_learners_table(&pool).await?;
    create_progress_records_table(&pool).await?;
    create_assignments_table(&pool).await?;

    Ok(pool)
}

/// Create the catalog works table
///
/// `name` is UNIQUE: it is the stable natural key that lets scoped
/// instances be re-linked after a catalog reseed.
pub async fn create_works_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS works (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            area TEXT NOT NULL CHECK (area IN ('practical_life', 'sensorial', 'mathematics', 'language', 'cultural')),
            category TEXT NOT NULL,
            sequence INTEGER NOT NULL,
            age_range TEXT NOT NULL CHECK (age_range IN ('toddler', 'primary_year1', 'primary_year2', 'primary_year3', 'lower_elementary', 'upper_elementary')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (sequence >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_works_area_sequence ON works(area, sequence)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the prerequisite edge table
pub async fn create_work_prerequisites_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS work_prerequisites (
            work_id TEXT NOT NULL REFERENCES works(guid) ON DELETE CASCADE,
            prerequisite_id TEXT NOT NULL REFERENCES works(guid) ON DELETE CASCADE,
            required INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (work_id, prerequisite_id),
            CHECK (work_id != prerequisite_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_work_prerequisites_work ON work_prerequisites(work_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the scoped instance table
///
/// `UNIQUE(scope_id, work_id)` is what makes seeding safe to repeat:
/// the existence check happens per-row at insert time, inside the
/// constraint, not in a separate read that could race.
pub async fn create_scoped_works_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scoped_works (
            guid TEXT PRIMARY KEY,
            scope_id TEXT NOT NULL,
            work_id TEXT NOT NULL REFERENCES works(guid) ON DELETE CASCADE,
            name TEXT NOT NULL,
            area TEXT NOT NULL,
            category TEXT NOT NULL,
            sequence INTEGER NOT NULL,
            age_range TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            materials_owned INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (scope_id, work_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_scoped_works_scope ON scoped_works(scope_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the learners table
pub async fn create_learners_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS learners (
            guid TEXT PRIMARY KEY,
            scope_id TEXT NOT NULL,
            name TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_learners_scope ON learners(scope_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the progress records table
///
/// One row per (learner, work instance) pair, created lazily on the
/// first status write via upsert.
pub async fn create_progress_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS progress_records (
            learner_id TEXT NOT NULL REFERENCES learners(guid) ON DELETE CASCADE,
            work_id TEXT NOT NULL REFERENCES scoped_works(guid) ON DELETE CASCADE,
            status TEXT NOT NULL CHECK (status IN ('not_started', 'presented', 'practicing', 'mastered')),
            presented_at TIMESTAMP,
            mastered_at TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (learner_id, work_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_progress_records_learner ON progress_records(learner_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the reconciled assignments table
pub async fn create_assignments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assignments (
            guid TEXT PRIMARY KEY,
            plan_id TEXT NOT NULL,
            learner_id TEXT NOT NULL REFERENCES learners(guid) ON DELETE CASCADE,
            work_id TEXT REFERENCES scoped_works(guid) ON DELETE SET NULL,
            raw_work_name TEXT,
            area TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (work_id IS NOT NULL OR raw_work_name IS NOT NULL)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assignments_plan ON assignments(plan_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assignments_learner ON assignments(learner_id)")
        .execute(pool)
        .await?;

    Ok(())
}
