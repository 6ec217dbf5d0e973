use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity: a deduplicated item collected from a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub title: String,
    /// Item link; unique per feed
    pub url: String,
    pub description: String,
    /// `None` when the item's pubDate could not be parsed
    pub published_at: Option<DateTime<Utc>>,

    /// Foreign key to feed
    pub feed_id: Uuid,
}

/// Insert request for a post. The caller supplies identity and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePost {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub url: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub feed_id: Uuid,
}
