use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use super::handle::IngestionHandle;
use super::messages::IngestionMessage;
use crate::config::DEFAULT_INTERVAL;
use crate::services::ingestion::IngestionService;

/// Drives [`IngestionService::run_tick`] on a fixed cadence.
///
/// Ticks never overlap: the actor awaits each batch before it looks at the
/// timer or its mailbox again. The first tick runs as soon as the actor starts.
pub struct IngestionActor {
    service: IngestionService,
    interval: Duration,
    receiver: mpsc::Receiver<IngestionMessage>,
}

impl IngestionActor {
    pub fn new(
        service: IngestionService,
        interval: Duration,
        receiver: mpsc::Receiver<IngestionMessage>,
    ) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!(
                "Ingestion interval must be positive, using {:?}",
                DEFAULT_INTERVAL
            );
            DEFAULT_INTERVAL
        } else {
            interval
        };

        Self {
            service,
            interval,
            receiver,
        }
    }

    /// Run the actor loop until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        tracing::info!(
            "Ingestion actor started: {} feeds per tick, every {:?}",
            self.service.concurrency(),
            self.interval
        );

        let mut timer = tokio::time::interval(self.interval);
        // A tick that overruns the interval pushes the schedule back instead
        // of firing a burst of catch-up ticks.
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut shutdown_reply: Option<oneshot::Sender<()>> = None;

        loop {
            tokio::select! {
                biased;

                _ = timer.tick() => {
                    self.service.run_tick().await;
                }

                msg = self.receiver.recv() => match msg {
                    Some(IngestionMessage::TriggerTick { reply }) => {
                        let report = self.service.run_tick().await;
                        let _ = reply.send(report);
                    }
                    Some(IngestionMessage::Shutdown { reply }) => {
                        shutdown_reply = Some(reply);
                        break;
                    }
                    None => break,
                },
            }
        }

        drop(self.receiver);
        tracing::info!("Ingestion actor stopped");

        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
    }
}

/// Spawn the ingestion actor on the current runtime
pub fn spawn_ingestion_actor(service: IngestionService, interval: Duration) -> IngestionHandle {
    let (sender, receiver) = mpsc::channel(8);
    let actor = IngestionActor::new(service, interval, receiver);
    tokio::spawn(actor.run());
    IngestionHandle::new(sender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::FetchFeed;
    use crate::services::ingestion::actor::IngestionError;
    use crate::services::test_support::{document, item, MemoryStore, StaticFetcher};
    use async_trait::async_trait;
    use feed::FeedDocument;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn store_with_feed() -> (Arc<MemoryStore>, Arc<StaticFetcher>) {
        let store = Arc::new(MemoryStore::default());
        let fetcher = Arc::new(StaticFetcher::default());
        store.add_feed("Example", "http://example.test/rss", None);
        fetcher.respond(
            "http://example.test/rss",
            document(vec![item("http://example.test/1", None)]),
        );
        (store, fetcher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval_starting_immediately() {
        let (store, fetcher) = store_with_feed();
        let service = IngestionService::new(store.clone(), fetcher, 10);

        let handle = spawn_ingestion_actor(service, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(125)).await;

        // t = 0, 60, 120
        assert_eq!(store.selections(), 3);
        assert_eq!(store.posts().len(), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_runs_a_tick_and_reports() {
        let (store, fetcher) = store_with_feed();
        let service = IngestionService::new(store.clone(), fetcher, 10);
        let handle = spawn_ingestion_actor(service, Duration::from_secs(3600));

        let report = handle.trigger().await.unwrap();

        assert_eq!(report.selected, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(store.selections(), 2);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_is_unavailable_after_shutdown() {
        let (store, fetcher) = store_with_feed();
        let service = IngestionService::new(store, fetcher, 10);
        let handle = spawn_ingestion_actor(service, Duration::from_secs(60));

        handle.shutdown().await;

        assert!(matches!(
            handle.trigger().await,
            Err(IngestionError::ServiceUnavailable)
        ));
        // A second shutdown is a no-op
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_selection_does_not_stop_later_ticks() {
        let (store, fetcher) = store_with_feed();
        store.fail_next_selection();
        let service = IngestionService::new(store.clone(), fetcher.clone(), 10);
        let handle = spawn_ingestion_actor(service, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.selections(), 1);
        assert!(fetcher.calls().is_empty());
        assert!(store.posts().is_empty());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.selections(), 2);
        assert_eq!(fetcher.calls(), vec!["http://example.test/rss"]);
        assert_eq!(store.posts().len(), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_falls_back_to_default() {
        let (store, fetcher) = store_with_feed();
        let service = IngestionService::new(store.clone(), fetcher, 10);
        let handle = spawn_ingestion_actor(service, Duration::ZERO);

        assert!(handle.trigger().await.is_ok());

        tokio::time::sleep(DEFAULT_INTERVAL + Duration::from_secs(1)).await;
        // Startup tick, the triggered tick and one scheduled tick
        assert_eq!(store.selections(), 3);

        handle.shutdown().await;
    }

    /// Takes a while to answer and counts completed fetches
    #[derive(Default)]
    struct SlowFetcher {
        completed: AtomicUsize,
    }

    #[async_trait]
    impl FetchFeed for SlowFetcher {
        async fn fetch(&self, _url: &str) -> feed::Result<FeedDocument> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(document(vec![]))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_in_flight_batch() {
        let store = Arc::new(MemoryStore::default());
        store.add_feed("a", "http://a.test/rss", None);
        store.add_feed("b", "http://b.test/rss", None);
        let fetcher = Arc::new(SlowFetcher::default());
        let service = IngestionService::new(store, fetcher.clone(), 10);
        let handle = spawn_ingestion_actor(service, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetcher.completed.load(Ordering::SeqCst), 0);

        handle.shutdown().await;

        assert_eq!(fetcher.completed.load(Ordering::SeqCst), 2);
    }
}
