pub mod feed;

pub use feed::{parse_history_page, FeedBatch, FeedClient, WingoFeedClient};

#[cfg(test)]
pub use feed::MockFeedClient;
