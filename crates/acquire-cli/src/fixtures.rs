//! Demo entities and the cache they populate.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use acquire_mock::{Faker, MockCache, MockGenerator, MockRegistry, Result};

use crate::config::FixtureConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub address: Address,
    pub phone: String,
    pub website: String,
    pub company: Company,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub post_id: u64,
    pub id: u64,
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Populated cache plus the user that owns CLI-created posts.
#[derive(Debug)]
pub struct Fixtures {
    pub cache: MockCache,
    pub demo_user: User,
}

pub fn register_fixtures(registry: &MockRegistry, faker: &Faker) {
    registry
        .entity::<Geo>()
        .mock("lat", faker.latitude())
        .mock("lng", faker.longitude());

    registry
        .entity::<Address>()
        .mock("street", faker.street())
        .mock(
            "suite",
            faker.rule(|rng| Value::from(format!("Suite {}", rng.random_range(100..1000)))),
        )
        .mock("city", faker.city())
        .mock("zipcode", faker.zip())
        .mock_nested::<Geo>("geo");

    registry
        .entity::<Company>()
        .mock("name", faker.company())
        .mock("catch_phrase", faker.catch_phrase())
        .mock("bs", faker.sentence(3..6));

    registry
        .entity::<User>()
        .mock_id("id")
        .mock("name", faker.name())
        .mock("username", faker.username())
        .mock("email", faker.email())
        .mock_nested::<Address>("address")
        .mock("phone", faker.phone())
        .mock("website", faker.url())
        .mock_nested::<Company>("company");

    registry
        .entity::<Post>()
        .mock_relation_id::<User>("user_id")
        .mock_id("id")
        .mock("title", faker.sentence(4..9))
        .mock("body", faker.paragraph(10));

    registry
        .entity::<Comment>()
        .mock_relation_id::<Post>("post_id")
        .mock_id("id")
        .mock("name", faker.name())
        .mock("email", faker.email())
        .mock("body", faker.sentence(6..14));
}

/// Build a cache of users, their posts and comments on those posts, then
/// add the demo user.
pub async fn populate(config: &FixtureConfig) -> Result<Fixtures> {
    let faker = config.seed.map_or_else(Faker::new, Faker::seeded);
    let registry = Arc::new(MockRegistry::new());
    register_fixtures(&registry, &faker);

    let cache = match config.seed {
        Some(seed) => MockCache::with_seed(Arc::clone(&registry), seed),
        None => MockCache::new(Arc::clone(&registry)),
    };

    cache.fill::<User>(config.users).await?;
    cache.fill::<Post>(config.posts).await?;
    cache.fill::<Comment>(config.comments).await?;

    let mut demo_user: User = MockGenerator::new(&registry)
        .with_cache(&cache)
        .generate_one(None)
        .await?;
    demo_user.name = config.demo_user.name.clone();
    demo_user.email = config.demo_user.email.clone();
    let demo_user = cache.add(demo_user);

    info!(
        users = cache.size::<User>(),
        posts = cache.size::<Post>(),
        comments = cache.size::<Comment>(),
        seed = ?config.seed,
        "mock cache populated"
    );
    Ok(Fixtures { cache, demo_user })
}

#[cfg(test)]
mod tests {
    use acquire_mock::MockError;

    use super::*;

    fn small(seed: u64) -> FixtureConfig {
        FixtureConfig {
            seed: Some(seed),
            users: 3,
            posts: 10,
            comments: 5,
            ..FixtureConfig::default()
        }
    }

    #[tokio::test]
    async fn populate_links_every_layer() {
        let fixtures = populate(&small(1)).await.expect("populate");
        let cache = &fixtures.cache;

        assert_eq!(cache.size::<User>(), 4);
        assert_eq!(cache.size::<Post>(), 10);
        assert_eq!(cache.size::<Comment>(), 5);

        let post_ids: Vec<u64> = cache.get::<Post>().iter().map(|post| post.id).collect();
        assert!(cache.get::<Post>().iter().all(|post| (1..=3).contains(&post.user_id)));
        assert!(
            cache
                .get::<Comment>()
                .iter()
                .all(|comment| post_ids.contains(&comment.post_id))
        );
    }

    #[tokio::test]
    async fn demo_user_takes_configured_identity() {
        let fixtures = populate(&small(1)).await.expect("populate");

        assert_eq!(fixtures.demo_user.id, 4);
        assert_eq!(fixtures.demo_user.name, "Demo user");
        assert_eq!(fixtures.demo_user.email, "user@demo.com");
        assert!(!fixtures.demo_user.address.city.is_empty());
        assert!(!fixtures.demo_user.address.geo.lat.is_empty());
        assert!(fixtures.demo_user.address.suite.starts_with("Suite "));
    }

    #[tokio::test]
    async fn equal_seeds_build_equal_caches() {
        let first = populate(&small(99)).await.expect("populate");
        let second = populate(&small(99)).await.expect("populate");

        assert_eq!(first.cache.get::<User>(), second.cache.get::<User>());
        assert_eq!(first.cache.get::<Post>(), second.cache.get::<Post>());
        assert_eq!(first.cache.get::<Comment>(), second.cache.get::<Comment>());
    }

    #[tokio::test]
    async fn posts_without_users_fail() {
        let config = FixtureConfig {
            users: 0,
            ..small(1)
        };
        let err = populate(&config).await.expect_err("no users to reference");
        assert!(matches!(err, MockError::EmptyRelation { .. }));
    }
}
