use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{CreatePost, Feed, Post};
use crate::repositories::{FeedRepository, PostRepository};

/// Storage operations the ingestion core depends on
///
/// Implementations must be safe to call from many ingestion units at once
/// and are the only arbiter of post uniqueness.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Up to `limit` feeds, never-fetched first, then oldest `last_fetched_at`
    async fn select_feeds_due_for_refresh(&self, limit: usize) -> Result<Vec<Feed>, StoreError>;

    /// Set the feed's `last_fetched_at` to now
    async fn mark_feed_refreshed(&self, feed_id: Uuid) -> Result<Feed, StoreError>;

    /// Insert a post; a duplicate (feed_id, url) yields [`StoreError::UniqueViolation`]
    async fn create_post(&self, post: CreatePost) -> Result<Post, StoreError>;
}

/// [`FeedStore`] backed by the SQLite repositories
#[derive(Clone)]
pub struct SqliteFeedStore {
    db: SqlitePool,
}

impl SqliteFeedStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeedStore for SqliteFeedStore {
    async fn select_feeds_due_for_refresh(&self, limit: usize) -> Result<Vec<Feed>, StoreError> {
        Ok(FeedRepository::get_next_to_fetch(&self.db, limit).await?)
    }

    async fn mark_feed_refreshed(&self, feed_id: Uuid) -> Result<Feed, StoreError> {
        FeedRepository::mark_fetched(&self.db, feed_id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("feed {}", feed_id)))
    }

    async fn create_post(&self, post: CreatePost) -> Result<Post, StoreError> {
        Ok(PostRepository::create(&self.db, post).await?)
    }
}
