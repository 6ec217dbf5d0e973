mod fetcher;
mod ingestion;
mod reconciler;
mod store;

#[cfg(test)]
mod test_support;

pub use fetcher::FetchFeed;
pub use ingestion::{
    spawn_ingestion_actor, FeedOutcome, IngestionActor, IngestionError, IngestionHandle,
    IngestionMessage, IngestionService, TickReport,
};
pub use reconciler::{parse_published_at, PostReconciler, ReconcileItemError, ReconcileStats};
pub use store::{FeedStore, SqliteFeedStore};
