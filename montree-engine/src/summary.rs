//! Per-area progress aggregation

use montree_common::{Area, ProgressStatus, Result};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::roster::get_learner;

/// Status counts for one area
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AreaSummary {
    pub area: String,
    pub total: u64,
    pub not_started: u64,
    pub presented: u64,
    pub practicing: u64,
    pub mastered: u64,
    /// `round(mastered / total * 100)`
    pub percent: u32,
}

/// Whole-scope progress summary for one learner
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProgressSummary {
    /// Canonical area order, unrecognized areas last
    pub per_area: Vec<AreaSummary>,
    pub total_works: u64,
    pub total_mastered: u64,
    pub percent: u32,
}

fn percent(mastered: u64, total: u64) -> u32 {
    if total == 0 {
        0
    } else {
        (mastered as f64 / total as f64 * 100.0).round() as u32
    }
}

/// Aggregate a learner's progress per area
///
/// Groups every scoped instance in the learner's scope by area and
/// counts progress records by status, defaulting un-recorded works to
/// `not_started`. Per-area totals always add up to the scope's
/// instance count.
pub async fn summarize(pool: &SqlitePool, learner_id: Uuid) -> Result<ProgressSummary> {
    let learner = get_learner(pool, learner_id).await?;

    let instances = sqlx::query(
        "SELECT guid, area FROM scoped_works WHERE scope_id = ? ORDER BY sequence, rowid",
    )
    .bind(&learner.scope_id)
    .fetch_all(pool)
    .await?;

    let status_rows = sqlx::query(
        "SELECT work_id, status FROM progress_records WHERE learner_id = ?",
    )
    .bind(learner_id.to_string())
    .fetch_all(pool)
    .await?;
    let mut statuses: HashMap<String, ProgressStatus> = HashMap::new();
    for row in status_rows {
        statuses.insert(
            row.get("work_id"),
            ProgressStatus::parse(&row.get::<String, _>("status"))?,
        );
    }

    let mut per_area: HashMap<String, AreaSummary> = HashMap::new();
    for row in &instances {
        let area: String = row.get("area");
        let guid: String = row.get("guid");
        let status = statuses
            .get(&guid)
            .copied()
            .unwrap_or(ProgressStatus::NotStarted);

        let entry = per_area.entry(area.clone()).or_insert_with(|| AreaSummary {
            area,
            ..AreaSummary::default()
        });
        entry.total += 1;
        match status {
            ProgressStatus::NotStarted => entry.not_started += 1,
            ProgressStatus::Presented => entry.presented += 1,
            ProgressStatus::Practicing => entry.practicing += 1,
            ProgressStatus::Mastered => entry.mastered += 1,
        }
    }

    let mut areas: Vec<AreaSummary> = per_area.into_values().collect();
    for summary in &mut areas {
        summary.percent = percent(summary.mastered, summary.total);
    }
    // Canonical reporting order; anything unrecognized sorts last
    areas.sort_by(|a, b| {
        Area::canonical_rank(&a.area)
            .cmp(&Area::canonical_rank(&b.area))
            .then_with(|| a.area.cmp(&b.area))
    });

    let total_works = areas.iter().map(|a| a.total).sum();
    let total_mastered = areas.iter().map(|a| a.mastered).sum();

    Ok(ProgressSummary {
        per_area: areas,
        total_works,
        total_mastered,
        percent: percent(total_mastered, total_works),
    })
}
