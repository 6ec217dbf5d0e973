use std::time::Duration;

use reqwest::Client;

use super::error::FeedError;
use super::models::FeedDocument;
use super::parser::parse_feed;

/// Timeout applied to a whole feed request when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("aggregator/", env!("CARGO_PKG_VERSION"));

/// RSS feed fetcher client
///
/// Every call is a single all-or-nothing request: either the whole document
/// decodes or a [`FeedError`] is returned. Nothing is retried here.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> super::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// Create a new FeedClient with a prebuilt reqwest Client
    ///
    /// The caller is responsible for configuring the timeout on `client`.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch and parse an RSS feed
    ///
    /// # Example
    /// ```ignore
    /// use feed::FeedClient;
    ///
    /// async fn example() -> feed::Result<()> {
    ///     let client = FeedClient::new(feed::DEFAULT_TIMEOUT)?;
    ///     let doc = client.fetch("https://blog.example.com/index.xml").await?;
    ///
    ///     for item in doc.items {
    ///         println!("{}", item.title);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn fetch(&self, url: &str) -> super::Result<FeedDocument> {
        tracing::debug!("Fetching RSS feed from: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await?;
        let document = parse_feed(&bytes)?;

        tracing::debug!("Parsed {} items from RSS feed {}", document.items.len(), url);
        Ok(document)
    }
}
