//! In-memory collaborators for exercising ingestion without a database or network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed::{FeedDocument, FeedError, FeedItem};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::fetcher::FetchFeed;
use super::store::FeedStore;
use crate::error::StoreError;
use crate::models::{CreatePost, Feed, Post};

pub fn item(link: &str, pub_date: Option<&str>) -> FeedItem {
    FeedItem {
        title: format!("Post at {}", link),
        link: link.to_string(),
        description: String::new(),
        pub_date: pub_date.map(str::to_string),
    }
}

pub fn document(items: Vec<FeedItem>) -> FeedDocument {
    FeedDocument {
        title: "Example".to_string(),
        link: "http://example.test/".to_string(),
        description: "Example feed".to_string(),
        language: None,
        items,
    }
}

#[derive(Default)]
struct StoreState {
    feeds: Vec<Feed>,
    posts: Vec<Post>,
    fail_next_selection: bool,
    failing_marks: HashSet<Uuid>,
    failing_posts: HashSet<String>,
    selections: usize,
}

/// Store that keeps rows in memory and enforces (feed_id, url) uniqueness
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn add_feed(&self, name: &str, url: &str, last_fetched_at: Option<DateTime<Utc>>) -> Feed {
        let now = Utc::now();
        let feed = Feed {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: name.to_string(),
            url: url.to_string(),
            user_id: Uuid::new_v4(),
            last_fetched_at,
        };
        self.state.lock().feeds.push(feed.clone());
        feed
    }

    pub fn feed(&self, id: Uuid) -> Feed {
        self.state
            .lock()
            .feeds
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .expect("feed exists")
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.lock().posts.clone()
    }

    pub fn selections(&self) -> usize {
        self.state.lock().selections
    }

    /// Make the next selection fail; later selections succeed again
    pub fn fail_next_selection(&self) {
        self.state.lock().fail_next_selection = true;
    }

    pub fn fail_mark(&self, feed_id: Uuid) {
        self.state.lock().failing_marks.insert(feed_id);
    }

    pub fn fail_post(&self, url: &str) {
        self.state.lock().failing_posts.insert(url.to_string());
    }
}

#[async_trait]
impl FeedStore for MemoryStore {
    async fn select_feeds_due_for_refresh(&self, limit: usize) -> Result<Vec<Feed>, StoreError> {
        let mut state = self.state.lock();
        state.selections += 1;

        if std::mem::take(&mut state.fail_next_selection) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut feeds = state.feeds.clone();
        feeds.sort_by_key(|f| (f.last_fetched_at, f.created_at));
        feeds.truncate(limit);
        Ok(feeds)
    }

    async fn mark_feed_refreshed(&self, feed_id: Uuid) -> Result<Feed, StoreError> {
        let mut state = self.state.lock();

        if state.failing_marks.contains(&feed_id) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let feed = state
            .feeds
            .iter_mut()
            .find(|f| f.id == feed_id)
            .ok_or_else(|| StoreError::not_found(format!("feed {}", feed_id)))?;

        let now = Utc::now();
        feed.last_fetched_at = Some(feed.last_fetched_at.map_or(now, |last| last.max(now)));
        feed.updated_at = now;
        Ok(feed.clone())
    }

    async fn create_post(&self, post: CreatePost) -> Result<Post, StoreError> {
        let mut state = self.state.lock();

        if state.failing_posts.contains(&post.url) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        if state
            .posts
            .iter()
            .any(|p| p.feed_id == post.feed_id && p.url == post.url)
        {
            return Err(StoreError::UniqueViolation(
                "UNIQUE constraint failed: posts.feed_id, posts.url".to_string(),
            ));
        }

        let post = Post {
            id: post.id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            title: post.title,
            url: post.url,
            description: post.description,
            published_at: post.published_at,
            feed_id: post.feed_id,
        };
        state.posts.push(post.clone());
        Ok(post)
    }
}

/// Fetcher that serves canned documents by URL and fails for unknown URLs
#[derive(Default)]
pub struct StaticFetcher {
    responses: Mutex<HashMap<String, FeedDocument>>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn respond(&self, url: &str, doc: FeedDocument) {
        self.responses.lock().insert(url.to_string(), doc);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl FetchFeed for StaticFetcher {
    async fn fetch(&self, url: &str) -> feed::Result<FeedDocument> {
        self.calls.lock().push(url.to_string());

        self.responses
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| FeedError::Parse(format!("no canned response for {}", url)))
    }
}
