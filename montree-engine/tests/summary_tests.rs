//! Per-area aggregation integration tests

mod helpers;

use helpers::{add_learner, add_work, instance_ref, setup_test_db};
use montree_common::{AgeTier, Area};
use montree_engine::{list_instances, seed, set_status, summarize};

#[tokio::test]
async fn test_language_area_counts_and_percent() {
    let (_dir, pool) = setup_test_db().await;
    for i in 0..10 {
        add_work(
            &pool,
            &format!("Language Work {}", i),
            Area::Language,
            i,
            AgeTier::PrimaryYear1,
            &[],
        )
        .await;
    }
    seed(&pool, "scope-a").await.unwrap();
    let learner = add_learner(&pool, "scope-a", "Emma", 4).await;

    let instances = list_instances(&pool, "scope-a").await.unwrap();
    for instance in &instances[0..3] {
        set_status(&pool, learner.guid, instance.guid, "mastered").await.unwrap();
    }
    for instance in &instances[3..5] {
        set_status(&pool, learner.guid, instance.guid, "practicing").await.unwrap();
    }
    set_status(&pool, learner.guid, instances[5].guid, "presented").await.unwrap();
    // Remaining four works never recorded: default to not_started

    let summary = summarize(&pool, learner.guid).await.unwrap();
    assert_eq!(summary.per_area.len(), 1);
    let language = &summary.per_area[0];
    assert_eq!(language.area, "language");
    assert_eq!(language.total, 10);
    assert_eq!(language.mastered, 3);
    assert_eq!(language.practicing, 2);
    assert_eq!(language.presented, 1);
    assert_eq!(language.not_started, 4);
    assert_eq!(language.percent, 30);
}

#[tokio::test]
async fn test_sum_law_across_areas() {
    let (_dir, pool) = setup_test_db().await;
    add_work(&pool, "Pouring Water", Area::PracticalLife, 1, AgeTier::Toddler, &[]).await;
    add_work(&pool, "Pink Tower", Area::Sensorial, 1, AgeTier::PrimaryYear1, &[]).await;
    add_work(&pool, "Brown Stair", Area::Sensorial, 2, AgeTier::PrimaryYear1, &[]).await;
    add_work(&pool, "Number Rods", Area::Mathematics, 1, AgeTier::PrimaryYear1, &[]).await;
    seed(&pool, "scope-a").await.unwrap();
    let learner = add_learner(&pool, "scope-a", "Emma", 4).await;

    let summary = summarize(&pool, learner.guid).await.unwrap();
    let instance_count = list_instances(&pool, "scope-a").await.unwrap().len() as u64;
    let area_total: u64 = summary.per_area.iter().map(|a| a.total).sum();
    assert_eq!(area_total, instance_count);
    assert_eq!(summary.total_works, instance_count);
}

#[tokio::test]
async fn test_canonical_area_order_with_unknown_last() {
    let (_dir, pool) = setup_test_db().await;
    add_work(&pool, "Sandpaper Letters", Area::Language, 1, AgeTier::PrimaryYear1, &[]).await;
    add_work(&pool, "Pouring Water", Area::PracticalLife, 1, AgeTier::Toddler, &[]).await;
    add_work(&pool, "Globe", Area::Cultural, 1, AgeTier::PrimaryYear1, &[]).await;
    seed(&pool, "scope-a").await.unwrap();

    // A legacy instance row with an area outside the canonical five
    let legacy_work = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO works (guid, name, area, category, sequence, age_range) VALUES (?, 'Old Craft', 'cultural', 'general', 99, 'primary_year1')",
    )
    .bind(&legacy_work)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        r#"
        INSERT INTO scoped_works (guid, scope_id, work_id, name, area, category, sequence, age_range)
        VALUES (?, 'scope-a', ?, 'Old Craft', 'handwork', 'general', 99, 'primary_year1')
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&legacy_work)
    .execute(&pool)
    .await
    .unwrap();

    let learner = add_learner(&pool, "scope-a", "Emma", 4).await;
    let summary = summarize(&pool, learner.guid).await.unwrap();
    let areas: Vec<&str> = summary.per_area.iter().map(|a| a.area.as_str()).collect();
    assert_eq!(areas, vec!["practical_life", "language", "cultural", "handwork"]);
}

#[tokio::test]
async fn test_summary_for_empty_scope() {
    let (_dir, pool) = setup_test_db().await;
    let learner = add_learner(&pool, "scope-a", "Emma", 4).await;

    let summary = summarize(&pool, learner.guid).await.unwrap();
    assert!(summary.per_area.is_empty());
    assert_eq!(summary.total_works, 0);
    assert_eq!(summary.percent, 0);
}

#[tokio::test]
async fn test_other_learners_progress_is_ignored() {
    let (_dir, pool) = setup_test_db().await;
    let work = add_work(&pool, "Pink Tower", Area::Sensorial, 1, AgeTier::PrimaryYear1, &[]).await;
    seed(&pool, "scope-a").await.unwrap();
    let emma = add_learner(&pool, "scope-a", "Emma", 4).await;
    let liam = add_learner(&pool, "scope-a", "Liam", 5).await;

    let work_ref = instance_ref(&pool, "scope-a", &work).await;
    set_status(&pool, liam.guid, work_ref, "mastered").await.unwrap();

    let summary = summarize(&pool, emma.guid).await.unwrap();
    assert_eq!(summary.per_area[0].mastered, 0);
    assert_eq!(summary.per_area[0].not_started, 1);
}
