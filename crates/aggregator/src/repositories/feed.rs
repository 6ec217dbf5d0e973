use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{CreateFeed, Feed};

/// Common SELECT fields for feed queries
const SELECT_FEED: &str = r#"
    SELECT
        id, created_at, updated_at,
        name, url, user_id, last_fetched_at
    FROM feeds
"#;

pub struct FeedRepository;

impl FeedRepository {
    /// Register a new feed
    pub async fn create(pool: &SqlitePool, data: CreateFeed) -> Result<Feed, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO feeds (id, created_at, updated_at, name, url, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(now)
        .bind(&data.name)
        .bind(&data.url)
        .bind(data.user_id)
        .execute(pool)
        .await?;

        Self::get_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Get a feed by ID
    pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Feed>, sqlx::Error> {
        let query = format!("{} WHERE id = $1", SELECT_FEED);
        sqlx::query_as::<_, Feed>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Get up to `limit` feeds that have waited longest for a refresh.
    ///
    /// Never-fetched feeds come first, then ascending `last_fetched_at`.
    /// Registration time breaks ties so the order is stable.
    pub async fn get_next_to_fetch(
        pool: &SqlitePool,
        limit: usize,
    ) -> Result<Vec<Feed>, sqlx::Error> {
        let query = format!(
            "{} ORDER BY last_fetched_at ASC NULLS FIRST, created_at ASC LIMIT $1",
            SELECT_FEED
        );
        sqlx::query_as::<_, Feed>(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(pool)
            .await
    }

    /// Record that the feed was picked up for refresh now.
    ///
    /// `last_fetched_at` only ever moves forward. Returns `None` if the feed
    /// does not exist.
    pub async fn mark_fetched(pool: &SqlitePool, id: Uuid) -> Result<Option<Feed>, sqlx::Error> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE feeds SET
                last_fetched_at = CASE
                    WHEN last_fetched_at IS NULL OR last_fetched_at < $1 THEN $2
                    ELSE last_fetched_at
                END,
                updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::get_by_id(pool, id).await
    }
}
