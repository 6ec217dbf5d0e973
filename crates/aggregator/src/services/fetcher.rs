use async_trait::async_trait;
use feed::{FeedClient, FeedDocument};

/// Retrieves and decodes a feed document by URL
#[async_trait]
pub trait FetchFeed: Send + Sync {
    async fn fetch(&self, url: &str) -> feed::Result<FeedDocument>;
}

#[async_trait]
impl FetchFeed for FeedClient {
    async fn fetch(&self, url: &str) -> feed::Result<FeedDocument> {
        FeedClient::fetch(self, url).await
    }
}
