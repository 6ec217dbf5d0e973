//! Feed ingestion
//!
//! Each tick selects the feeds that have waited longest, refreshes them
//! concurrently (one task per feed) and waits for the whole batch before
//! returning. The actor in [`actor`] drives ticks on a fixed cadence.

mod actor;

pub use actor::{
    spawn_ingestion_actor, IngestionActor, IngestionError, IngestionHandle, IngestionMessage,
};

use feed::FeedError;
use std::sync::Arc;
use tokio::task::JoinSet;

use super::fetcher::FetchFeed;
use super::reconciler::{PostReconciler, ReconcileStats};
use super::store::FeedStore;
use crate::error::StoreError;
use crate::models::Feed;

/// What happened to one feed during a tick
#[derive(Debug)]
pub enum FeedOutcome {
    /// The refresh timestamp could not be recorded; the feed was not fetched
    MarkFailed(StoreError),
    /// The feed was marked but could not be fetched or decoded
    FetchFailed(FeedError),
    /// The document was fetched and every item was submitted
    Reconciled(ReconcileStats),
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The selection query failed and the tick did nothing
    pub selection_failed: bool,
    /// Feeds returned by the selection query
    pub selected: usize,
    /// Feeds whose document was fetched and reconciled
    pub reconciled: usize,
    /// Feeds abandoned for this tick (mark, fetch or task failure)
    pub failed: usize,
    pub posts_created: usize,
    pub duplicates: usize,
    pub item_errors: usize,
}

impl TickReport {
    fn record(&mut self, outcome: &FeedOutcome) {
        match outcome {
            FeedOutcome::Reconciled(stats) => {
                self.reconciled += 1;
                self.posts_created += stats.created;
                self.duplicates += stats.duplicates;
                self.item_errors += stats.errors.len();
            }
            FeedOutcome::MarkFailed(_) | FeedOutcome::FetchFailed(_) => self.failed += 1,
        }
    }
}

/// Everything one ingestion unit needs, cheap to clone into a task
#[derive(Clone)]
struct FeedIngestor {
    store: Arc<dyn FeedStore>,
    fetcher: Arc<dyn FetchFeed>,
    reconciler: Arc<PostReconciler>,
}

impl FeedIngestor {
    /// Mark, fetch, reconcile, in that order
    async fn ingest(&self, feed: Feed) -> FeedOutcome {
        // Marking first keeps a feed out of the next selection even if the
        // fetch below hangs until its timeout or fails.
        if let Err(e) = self.store.mark_feed_refreshed(feed.id).await {
            tracing::error!("[{}] Failed to mark feed fetched: {}", feed.name, e);
            return FeedOutcome::MarkFailed(e);
        }

        let doc = match self.fetcher.fetch(&feed.url).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("[{}] RSS fetch failed ({}): {}", feed.name, feed.url, e);
                return FeedOutcome::FetchFailed(e);
            }
        };

        let stats = self.reconciler.reconcile(&feed, &doc).await;

        tracing::info!(
            "[{}] Feed collected: {} items, {} new, {} known, {} failed",
            feed.name,
            stats.attempted,
            stats.created,
            stats.duplicates,
            stats.errors.len()
        );

        FeedOutcome::Reconciled(stats)
    }
}

/// Periodic feed refresh: selection, bounded fan-out, barrier
pub struct IngestionService {
    store: Arc<dyn FeedStore>,
    ingestor: FeedIngestor,
    concurrency: usize,
}

impl IngestionService {
    /// `concurrency` caps how many feeds one tick refreshes (and therefore
    /// how many run at once). Zero is raised to one.
    pub fn new(store: Arc<dyn FeedStore>, fetcher: Arc<dyn FetchFeed>, concurrency: usize) -> Self {
        let concurrency = if concurrency == 0 {
            tracing::warn!("Ingestion concurrency must be positive, using 1");
            1
        } else {
            concurrency
        };

        let reconciler = Arc::new(PostReconciler::new(Arc::clone(&store)));

        Self {
            ingestor: FeedIngestor {
                store: Arc::clone(&store),
                fetcher,
                reconciler,
            },
            store,
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Refresh a single feed outside the tick cadence
    pub async fn ingest_feed(&self, feed: Feed) -> FeedOutcome {
        self.ingestor.ingest(feed).await
    }

    /// Run one tick and return once every unit in the batch has finished.
    ///
    /// Nothing that goes wrong inside a tick is returned as an error: a failed
    /// selection skips the tick, failed units are counted and logged.
    pub async fn run_tick(&self) -> TickReport {
        let mut report = TickReport::default();

        let feeds = match self.store.select_feeds_due_for_refresh(self.concurrency).await {
            Ok(feeds) => feeds,
            Err(e) => {
                tracing::error!("Failed to get feeds to fetch: {}", e);
                report.selection_failed = true;
                return report;
            }
        };

        if feeds.is_empty() {
            tracing::debug!("No feeds to fetch");
            return report;
        }

        report.selected = feeds.len();
        tracing::info!("Found {} feeds to fetch", feeds.len());

        let mut tasks = JoinSet::new();
        for feed in feeds {
            let ingestor = self.ingestor.clone();
            tasks.spawn(async move { ingestor.ingest(feed).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    tracing::error!("Ingestion task did not complete: {}", e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Tick completed: {} feeds, {} reconciled, {} failed, {} new posts, {} known, {} item errors",
            report.selected,
            report.reconciled,
            report.failed,
            report.posts_created,
            report.duplicates,
            report.item_errors
        );

        report
    }
}
