use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{CreatePost, Post};

/// Common SELECT fields for post queries
const SELECT_POST: &str = r#"
    SELECT
        id, created_at, updated_at,
        title, url, description, published_at, feed_id
    FROM posts
"#;

pub struct PostRepository;

impl PostRepository {
    /// Insert a post.
    ///
    /// A post whose (feed_id, url) already exists is rejected by the unique
    /// constraint; the error is returned to the caller unchanged.
    pub async fn create(pool: &SqlitePool, data: CreatePost) -> Result<Post, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, created_at, updated_at, title, url, description, published_at, feed_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(data.id)
        .bind(data.created_at)
        .bind(data.updated_at)
        .bind(&data.title)
        .bind(&data.url)
        .bind(&data.description)
        .bind(data.published_at)
        .bind(data.feed_id)
        .execute(pool)
        .await?;

        Self::get_by_id(pool, data.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Get a post by ID
    pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("{} WHERE id = $1", SELECT_POST);
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Get all posts of a feed, newest publication first, undated posts last
    pub async fn get_by_feed_id(
        pool: &SqlitePool,
        feed_id: Uuid,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "{} WHERE feed_id = $1 ORDER BY published_at DESC NULLS LAST, created_at DESC",
            SELECT_POST
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(feed_id)
            .fetch_all(pool)
            .await
    }

    /// Count posts of a feed
    pub async fn count_by_feed_id(pool: &SqlitePool, feed_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE feed_id = $1")
            .bind(feed_id)
            .fetch_one(pool)
            .await
    }
}
