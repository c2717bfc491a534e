//! Seeding integration tests: idempotence and customization survival

mod helpers;

use helpers::{add_work, setup_test_db};
use montree_common::{AgeTier, Area, Error};
use montree_engine::{list_instances, seed, update_instance, InstanceChanges};

#[tokio::test]
async fn test_seed_instantiates_full_catalog() {
    let (_dir, pool) = setup_test_db().await;
    add_work(&pool, "Pouring Water", Area::PracticalLife, 1, AgeTier::Toddler, &[]).await;
    add_work(&pool, "Pink Tower", Area::Sensorial, 1, AgeTier::PrimaryYear1, &[]).await;

    let outcome = seed(&pool, "classroom-a").await.unwrap();
    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.skipped, 0);

    let instances = list_instances(&pool, "classroom-a").await.unwrap();
    assert_eq!(instances.len(), 2);
    // Catalog fields are copied onto the instance
    let pouring = instances.iter().find(|i| i.name == "Pouring Water").unwrap();
    assert_eq!(pouring.area, "practical_life");
    assert_eq!(pouring.sequence, 1);
    assert_eq!(pouring.age_range, "toddler");
    // Instance-local fields start at defaults
    assert!(pouring.is_active);
    assert!(!pouring.materials_owned);
    assert!(pouring.notes.is_none());
}

#[tokio::test]
async fn test_seed_is_idempotent_on_count() {
    let (_dir, pool) = setup_test_db().await;
    add_work(&pool, "Pouring Water", Area::PracticalLife, 1, AgeTier::Toddler, &[]).await;
    add_work(&pool, "Pink Tower", Area::Sensorial, 1, AgeTier::PrimaryYear1, &[]).await;

    let first = seed(&pool, "classroom-a").await.unwrap();
    assert_eq!(first.created, 2);

    let second = seed(&pool, "classroom-a").await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 2);

    let instances = list_instances(&pool, "classroom-a").await.unwrap();
    assert_eq!(instances.len(), 2);
}

#[tokio::test]
async fn test_reseeding_preserves_customization() {
    let (_dir, pool) = setup_test_db().await;
    add_work(&pool, "Pouring Water", Area::PracticalLife, 1, AgeTier::Toddler, &[]).await;

    seed(&pool, "classroom-a").await.unwrap();
    let instance = &list_instances(&pool, "classroom-a").await.unwrap()[0];

    update_instance(
        &pool,
        instance.guid,
        InstanceChanges {
            is_active: Some(false),
            materials_owned: Some(true),
            notes: Some("set is missing a piece".to_string()),
        },
    )
    .await
    .unwrap();

    // Catalog grows, then the scope is reseeded incrementally
    add_work(&pool, "Table Washing", Area::PracticalLife, 2, AgeTier::PrimaryYear1, &[]).await;
    let outcome = seed(&pool, "classroom-a").await.unwrap();
    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.skipped, 1);

    let instances = list_instances(&pool, "classroom-a").await.unwrap();
    assert_eq!(instances.len(), 2);
    let customized = instances.iter().find(|i| i.name == "Pouring Water").unwrap();
    assert!(!customized.is_active);
    assert!(customized.materials_owned);
    assert_eq!(customized.notes.as_deref(), Some("set is missing a piece"));
}

#[tokio::test]
async fn test_seed_scopes_are_independent() {
    let (_dir, pool) = setup_test_db().await;
    add_work(&pool, "Pouring Water", Area::PracticalLife, 1, AgeTier::Toddler, &[]).await;

    seed(&pool, "classroom-a").await.unwrap();
    let outcome = seed(&pool, "classroom-b").await.unwrap();
    assert_eq!(outcome.created, 1);

    assert_eq!(list_instances(&pool, "classroom-a").await.unwrap().len(), 1);
    assert_eq!(list_instances(&pool, "classroom-b").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_seed_empty_catalog_is_noop() {
    let (_dir, pool) = setup_test_db().await;
    let outcome = seed(&pool, "classroom-a").await.unwrap();
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.skipped, 0);
}

#[tokio::test]
async fn test_seed_rejects_empty_scope() {
    let (_dir, pool) = setup_test_db().await;
    let err = seed(&pool, "  ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_concurrent_seed_never_double_inserts() {
    let (_dir, pool) = setup_test_db().await;
    for i in 0..10 {
        add_work(
            &pool,
            &format!("Work {}", i),
            Area::Sensorial,
            i,
            AgeTier::PrimaryYear1,
            &[],
        )
        .await;
    }

    // Two seeds racing on the same scope; the unique key arbitrates
    let (a, b) = tokio::join!(seed(&pool, "classroom-a"), seed(&pool, "classroom-a"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.created + b.created, 10);
    assert_eq!(list_instances(&pool, "classroom-a").await.unwrap().len(), 10);
}
