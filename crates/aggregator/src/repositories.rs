mod feed;
mod post;

pub use feed::FeedRepository;
pub use post::PostRepository;
