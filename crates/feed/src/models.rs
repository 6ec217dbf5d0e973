use serde::{Deserialize, Serialize};

/// One decoded fetch of an RSS feed: channel metadata plus its items in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Channel language, when the feed declares one
    pub language: Option<String>,
    pub items: Vec<FeedItem>,
}

/// A single `<item>` of a feed, before it is persisted as a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Raw `<pubDate>` text, left in the feed's own format
    pub pub_date: Option<String>,
}
