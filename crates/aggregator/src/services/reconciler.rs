use chrono::{DateTime, Utc};
use feed::{FeedDocument, FeedItem};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::store::FeedStore;
use crate::error::StoreError;
use crate::models::{CreatePost, Feed};

/// A single item that could not be stored for a reason other than being a duplicate
#[derive(Debug, Error)]
#[error("failed to store post {link}: {source}")]
pub struct ReconcileItemError {
    pub link: String,
    #[source]
    pub source: StoreError,
}

/// Outcome of reconciling one feed document
#[derive(Debug, Default)]
pub struct ReconcileStats {
    /// Items submitted to the store
    pub attempted: usize,
    /// Items stored as new posts
    pub created: usize,
    /// Items the store already knew about
    pub duplicates: usize,
    pub errors: Vec<ReconcileItemError>,
}

/// Turns feed items into posts.
///
/// Every item is attempted independently: a duplicate is absorbed silently,
/// any other failure is recorded and the next item still runs. Feed rows are
/// never touched here.
pub struct PostReconciler {
    store: Arc<dyn FeedStore>,
}

impl PostReconciler {
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        Self { store }
    }

    pub async fn reconcile(&self, feed: &Feed, doc: &FeedDocument) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        for item in &doc.items {
            stats.attempted += 1;

            match self.store.create_post(new_post(feed, item)).await {
                Ok(post) => {
                    tracing::debug!("[{}] New post: {}", feed.name, post.title);
                    stats.created += 1;
                }
                Err(e) if e.is_unique_violation() => {
                    tracing::debug!("[{}] Skipping known post: {}", feed.name, item.link);
                    stats.duplicates += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "[{}] Failed to create post {}: {}",
                        feed.name,
                        item.link,
                        e
                    );
                    stats.errors.push(ReconcileItemError {
                        link: item.link.clone(),
                        source: e,
                    });
                }
            }
        }

        stats
    }
}

fn new_post(feed: &Feed, item: &FeedItem) -> CreatePost {
    let now = Utc::now();

    CreatePost {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        title: item.title.clone(),
        url: item.link.clone(),
        description: item.description.clone(),
        published_at: parse_published_at(item.pub_date.as_deref()),
        feed_id: feed.id,
    }
}

/// Parse an item's publication date.
///
/// RSS dates are RFC 822/1123 (`Mon, 02 Jan 2006 15:04:05 GMT`); some feeds
/// emit RFC 3339 instead. Anything else is treated as absent.
///
/// A weekday that does not match the date is ignored.
pub fn parse_published_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(strip_weekday(raw)))
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|date| date.with_timezone(&Utc))
        .ok()
}

fn strip_weekday(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((day, rest)) if !day.is_empty() && day.chars().all(|c| c.is_ascii_alphabetic()) => {
            rest.trim_start()
        }
        _ => raw,
    }
}
