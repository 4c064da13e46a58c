use serde::Serialize;
use serde_json::{Value, json};

use acquire_mock::{Result, SortDirection};

use crate::fixtures::{Fixtures, Post};

const SEARCH_FIELDS: &[&str] = &["title", "body"];
const FIRST_PAGE: i64 = 1;

#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub user_id: Option<u64>,
    pub page: Option<i64>,
    pub limit: Option<usize>,
    pub sort: Option<String>,
    pub order: SortDirection,
    pub search: Option<String>,
}

/// One page of posts. `total` counts the whole partition.
#[derive(Debug, Serialize)]
pub struct PostPage {
    pub total: usize,
    pub data: Vec<Post>,
}

pub fn list_posts(fixtures: &Fixtures, query: &PostQuery) -> PostPage {
    let simulator = fixtures.cache.create_simulator::<Post>();
    let by_user = query
        .user_id
        .map(|user_id| move |post: &Post| post.user_id == user_id);

    let data = simulator
        .filter(by_user.as_ref().map(|f| f as &dyn Fn(&Post) -> bool))
        .search(query.search.as_deref(), Some(SEARCH_FIELDS), false)
        .sort(query.sort.as_deref(), query.order)
        .paginate(query.page, query.limit, FIRST_PAGE)
        .into_vec();

    PostPage {
        total: simulator.count(),
        data,
    }
}

/// Store a post owned by the demo user under the next free identity.
pub async fn create_post(fixtures: &Fixtures, title: &str, body: &str) -> Result<Post> {
    let simulator = fixtures.cache.create_simulator::<Post>();
    let id = simulator.generate_next_id().await?.unwrap_or(Value::Null);
    simulator.create_from(json!({
        "id": id,
        "user_id": fixtures.demo_user.id,
        "title": title,
        "body": body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureConfig;
    use crate::fixtures::populate;

    async fn fixtures() -> Fixtures {
        let config = FixtureConfig {
            seed: Some(3),
            users: 4,
            posts: 12,
            comments: 0,
            ..FixtureConfig::default()
        };
        populate(&config).await.expect("populate")
    }

    #[tokio::test]
    async fn pages_are_one_based() {
        let fixtures = fixtures().await;
        let query = PostQuery {
            page: Some(1),
            limit: Some(5),
            sort: Some("id".to_string()),
            ..PostQuery::default()
        };

        let page = list_posts(&fixtures, &query);
        assert_eq!(page.total, 12);
        assert_eq!(page.data.iter().map(|p| p.id).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);

        let last = list_posts(&fixtures, &PostQuery { page: Some(3), ..query.clone() });
        assert_eq!(last.data.iter().map(|p| p.id).collect::<Vec<_>>(), [11, 12]);

        let before_first = list_posts(&fixtures, &PostQuery { page: Some(0), ..query });
        assert!(before_first.data.is_empty());
    }

    #[tokio::test]
    async fn filters_by_author_and_orders_descending() {
        let fixtures = fixtures().await;
        let author = fixtures.cache.get::<Post>()[0].user_id;
        let query = PostQuery {
            user_id: Some(author),
            sort: Some("id".to_string()),
            order: SortDirection::Desc,
            ..PostQuery::default()
        };

        let page = list_posts(&fixtures, &query);
        assert!(!page.data.is_empty());
        assert!(page.data.iter().all(|post| post.user_id == author));
        assert!(page.data.windows(2).all(|pair| pair[0].id > pair[1].id));
        assert_eq!(page.total, 12);
    }

    #[tokio::test]
    async fn created_post_belongs_to_demo_user() {
        let fixtures = fixtures().await;

        let post = create_post(&fixtures, "Hello", "First post").await.expect("create");
        assert_eq!(post.id, 13);
        assert_eq!(post.user_id, fixtures.demo_user.id);
        assert_eq!(fixtures.cache.size::<Post>(), 13);

        let found = list_posts(
            &fixtures,
            &PostQuery {
                search: Some("first POST".to_string()),
                ..PostQuery::default()
            },
        );
        assert!(found.data.contains(&post));
    }
}
