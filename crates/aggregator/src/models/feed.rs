use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feed entity: a remote RSS source registered by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Feed {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Display name
    pub name: String,
    /// RSS feed URL
    pub url: String,
    /// Owning account
    pub user_id: Uuid,
    /// Last time ingestion picked this feed up; `None` until the first refresh.
    /// Never moves backwards.
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// Data needed to register a feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeed {
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
}
