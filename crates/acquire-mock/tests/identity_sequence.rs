use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use acquire_mock::{FieldRule, MockCache, MockGenerator, MockRegistry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Comment {
    id: u64,
    body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Ticket {
    code: String,
}

fn registry() -> MockRegistry {
    let registry = MockRegistry::new();
    registry
        .entity::<Comment>()
        .mock_id("id")
        .mock("body", json!("text"));
    registry
}

#[tokio::test]
async fn sequential_generation_counts_from_one() {
    let registry = registry();
    let generator = MockGenerator::new(&registry);

    let mut ids = Vec::new();
    for _ in 0..4 {
        let comment: Comment = generator.generate_one(None).await.expect("generate");
        ids.push(comment.id);
    }
    assert_eq!(ids, vec![1, 2, 3, 4]);

    registry.reset_counters();
    let comment: Comment = generator.generate_one(None).await.expect("generate");
    assert_eq!(comment.id, 1);
}

#[tokio::test]
async fn duplicate_identity_keeps_first_field() {
    let registry = registry();
    registry.entity::<Comment>().mock_id("body");

    let comment: Comment = MockGenerator::new(&registry)
        .generate_one(None)
        .await
        .expect("generate");
    assert_eq!(comment.id, 1);
    assert_eq!(comment.body, "text");
}

#[tokio::test]
async fn custom_identity_rule_is_used() {
    let registry = MockRegistry::new();
    registry
        .entity::<Ticket>()
        .mock_id_with("code", FieldRule::sync(|_| json!("T-1")));
    let cache = MockCache::new(Arc::new(registry));

    let next = cache
        .create_simulator::<Ticket>()
        .generate_next_id()
        .await
        .expect("next id");
    assert_eq!(next, Some(json!("T-1")));
}

#[tokio::test]
async fn next_id_reserves_the_following_identity() {
    let cache = MockCache::with_seed(Arc::new(registry()), 1);
    cache.fill::<Comment>(3).await.expect("fill");

    let simulator = cache.create_simulator::<Comment>();
    let next = simulator.generate_next_id().await.expect("next id");
    assert_eq!(next, Some(Value::from(4_u64)));
    assert_eq!(simulator.count(), 3);

    let created = cache.add_generated::<Comment>().await.expect("add");
    assert_eq!(created.id, 5);
}

#[tokio::test]
async fn next_id_is_none_without_identity() {
    let cache = MockCache::new(Arc::new(MockRegistry::new()));
    let next = cache
        .create_simulator::<Ticket>()
        .generate_next_id()
        .await
        .expect("next id");
    assert_eq!(next, None);
}
