//! Next-work recommendation
//!
//! Filters the scoped catalog by the learner's age-tier set and
//! prerequisite satisfaction, then ranks by sequence. A work that has
//! been presented or is being practiced but not yet mastered remains a
//! valid target; only mastery removes it from the candidate pool.

use montree_common::tier::{age_in_years, tiers_for_age};
use montree_common::{time, AgeTier, Area, Result};
use sqlx::{Row, SqlitePool};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::roster::get_learner;

/// Default number of recommendations returned
pub const DEFAULT_LIMIT: usize = 10;

/// One recommended work instance
#[derive(Debug, Clone, serde::Serialize)]
pub struct RecommendedWork {
    /// Scoped instance ref (the id the ledger uses)
    pub instance_id: Uuid,
    pub name: String,
    pub area: String,
    pub category: String,
    pub sequence: i64,
    pub age_range: String,
}

/// Recommend what a learner should attempt next
///
/// A candidate is available iff its age range intersects the learner's
/// tier set, it is not in the learner's mastered set, and every
/// `required` prerequisite is mastered within the learner's scope.
/// Optional prerequisites are advisory and never block. Candidates are
/// ordered by ascending sequence (ties by catalog insertion order) and
/// truncated to `limit` (default 10).
pub async fn recommend(
    pool: &SqlitePool,
    learner_id: Uuid,
    area: Option<Area>,
    limit: Option<usize>,
) -> Result<Vec<RecommendedWork>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let learner = get_learner(pool, learner_id).await?;

    let age = age_in_years(learner.birth_date, time::now().date_naive());
    let tiers = tiers_for_age(age);

    // Active instances for the learner's scope, already in rank order
    let instances = sqlx::query(
        r#"
        SELECT guid, work_id, name, area, category, sequence, age_range
        FROM scoped_works
        WHERE scope_id = ? AND is_active = 1
        ORDER BY sequence, rowid
        "#,
    )
    .bind(&learner.scope_id)
    .fetch_all(pool)
    .await?;

    // Required-prerequisite edges, keyed by catalog work id
    let edge_rows = sqlx::query(
        "SELECT work_id, prerequisite_id FROM work_prerequisites WHERE required = 1",
    )
    .fetch_all(pool)
    .await?;
    let mut required_prereqs: HashMap<String, Vec<String>> = HashMap::new();
    for row in edge_rows {
        required_prereqs
            .entry(row.get("work_id"))
            .or_default()
            .push(row.get("prerequisite_id"));
    }

    // Mastered set, as instance refs
    let mastered_rows = sqlx::query(
        "SELECT work_id FROM progress_records WHERE learner_id = ? AND status = 'mastered'",
    )
    .bind(learner_id.to_string())
    .fetch_all(pool)
    .await?;
    let mastered_instances: HashSet<String> = mastered_rows
        .into_iter()
        .map(|row| row.get("work_id"))
        .collect();

    // Prerequisite edges point at catalog works; project the mastered
    // set onto catalog ids through this scope's instances.
    let mastered_catalog: HashSet<String> = instances
        .iter()
        .filter(|row| mastered_instances.contains(&row.get::<String, _>("guid")))
        .map(|row| row.get("work_id"))
        .collect();

    let mut recommendations = Vec::new();
    for row in &instances {
        if recommendations.len() >= limit {
            break;
        }

        let instance_area: String = row.get("area");
        if let Some(filter) = area {
            if instance_area != filter.as_str() {
                continue;
            }
        }

        let instance_guid: String = row.get("guid");

        // scoped_works carries no vocabulary constraint on age_range,
        // so a legacy row may hold a tag outside the tier set. Skip it
        // rather than failing the whole call.
        let age_range: String = row.get("age_range");
        let tier = match AgeTier::parse(&age_range) {
            Ok(tier) => tier,
            Err(_) => {
                warn!(work = %instance_guid, age_range, "unrecognized age range, skipping");
                continue;
            }
        };
        if !tiers.contains(&tier) {
            continue;
        }

        if mastered_instances.contains(&instance_guid) {
            continue;
        }

        // Every required prerequisite must be mastered in this scope.
        // A required prerequisite with no instance here cannot be
        // mastered and therefore blocks.
        let catalog_id: String = row.get("work_id");
        if let Some(prereqs) = required_prereqs.get(&catalog_id) {
            if !prereqs.iter().all(|p| mastered_catalog.contains(p)) {
                debug!(work = %instance_guid, "required prerequisite not mastered, skipping");
                continue;
            }
        }

        recommendations.push(RecommendedWork {
            instance_id: crate::parse_guid(&instance_guid)?,
            name: row.get("name"),
            area: instance_area,
            category: row.get("category"),
            sequence: row.get("sequence"),
            age_range,
        });
    }

    debug!(
        learner = %learner_id,
        age,
        candidates = recommendations.len(),
        "computed recommendations"
    );

    Ok(recommendations)
}
