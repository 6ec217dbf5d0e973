mod client;
mod error;
pub mod models;
mod parser;

pub use client::{FeedClient, DEFAULT_TIMEOUT};
pub use error::FeedError;
pub use models::{FeedDocument, FeedItem};
pub use parser::parse_feed;

pub type Result<T> = std::result::Result<T, FeedError>;
