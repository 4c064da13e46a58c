use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use acquire_mock::{
    EntityMocks, FieldRule, MockCache, MockError, MockGenerator, MockRegistry, Mockable,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

impl Mockable for User {
    fn declare_mocks(mocks: &mut EntityMocks<'_, Self>) {
        mocks.mock_id("id").mock("name", json!("placeholder"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Post {
    id: u64,
    user_id: u64,
    user_name: String,
    title: String,
}

impl Mockable for Post {
    fn declare_mocks(mocks: &mut EntityMocks<'_, Self>) {
        mocks
            .mock_id("id")
            .mock_relation_id::<User>("user_id")
            .mock_relation_property::<User>("user_name", "name")
            .mock("title", FieldRule::literal("Hello"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Tag {
    label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Tagging {
    tag: String,
}

fn session(seed: u64) -> MockCache {
    let registry = Arc::new(MockRegistry::new());
    registry.register::<User>();
    registry.register::<Post>();
    MockCache::with_seed(registry, seed)
}

#[tokio::test]
async fn relation_ids_come_from_cached_users() {
    let cache = session(11);
    cache.fill::<User>(5).await.expect("fill users");
    let posts = cache.fill::<Post>(50).await.expect("fill posts");

    let user_ids: Vec<u64> = cache.get::<User>().iter().map(|user| user.id).collect();
    assert_eq!(user_ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(posts.len(), 50);
    assert!(posts.iter().all(|post| user_ids.contains(&post.user_id)));
    assert_eq!(cache.size::<Post>(), 50);
}

#[tokio::test]
async fn batch_instances_pick_relations_independently() {
    let cache = session(11);
    cache.fill::<User>(5).await.expect("fill users");
    let posts = cache.fill::<Post>(50).await.expect("fill posts");

    let authors: HashSet<u64> = posts.iter().map(|post| post.user_id).collect();
    assert!(authors.len() > 1, "every post referenced the same user");
}

#[tokio::test]
async fn relation_fields_share_one_referenced_instance() {
    let cache = session(5);
    for (id, name) in [(1, "Alice"), (2, "Bob"), (3, "Charlie")] {
        cache.add(User {
            id,
            name: name.to_string(),
        });
    }

    let posts = cache.fill::<Post>(30).await.expect("fill posts");
    let users = cache.get::<User>();
    for post in posts {
        let author = users
            .iter()
            .find(|user| user.id == post.user_id)
            .expect("author exists");
        assert_eq!(post.user_name, author.name);
    }
}

#[tokio::test]
async fn empty_target_partition_is_a_configuration_error() {
    let cache = session(1);
    let err = cache.fill::<Post>(1).await.expect_err("no users cached");
    match &err {
        MockError::EmptyRelation { entity, target, .. } => {
            assert_eq!(entity, "Post");
            assert_eq!(target, "User");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("fill::<User>"));
    assert_eq!(cache.size::<Post>(), 0);
}

#[tokio::test]
async fn emptied_target_partition_still_fails() {
    let cache = session(1);
    let user = cache.add_generated::<User>().await.expect("add user");
    cache.remove(&user);

    let result = cache.fill::<Post>(1).await;
    assert!(matches!(result, Err(MockError::EmptyRelation { .. })));
}

#[tokio::test]
async fn relation_target_without_identity_is_rejected() {
    let registry = Arc::new(MockRegistry::new());
    registry.entity::<Tag>().mock("label", json!("rust"));
    registry
        .entity::<Tagging>()
        .mock_relation_property::<Tag>("tag", "label");
    let cache = MockCache::with_seed(registry, 3);
    cache.fill::<Tag>(2).await.expect("fill tags");

    let err = cache.fill::<Tagging>(1).await.expect_err("tag has no identity");
    assert!(matches!(
        err,
        MockError::MissingIdentity { ref target, .. } if target == "Tag"
    ));
}

#[tokio::test]
async fn relations_without_cache_keep_defaults() {
    let registry = MockRegistry::new();
    registry.register::<User>();
    registry.register::<Post>();

    let post: Post = MockGenerator::new(&registry)
        .generate_one(None)
        .await
        .expect("generate without cache");
    assert_eq!(post.id, 1);
    assert_eq!(post.user_id, 0);
    assert_eq!(post.user_name, "");
    assert_eq!(post.title, "Hello");
}

#[tokio::test]
async fn equal_seeds_reproduce_relation_picks() {
    async fn run() -> Vec<u64> {
        let cache = session(2024);
        cache.fill::<User>(10).await.expect("fill users");
        let posts = cache.fill::<Post>(20).await.expect("fill posts");
        let mut posts = posts;
        posts.sort_by_key(|post| post.id);
        posts.into_iter().map(|post| post.user_id).collect()
    }

    assert_eq!(run().await, run().await);
}
