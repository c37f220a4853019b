mod client;
mod tree;
mod types;

pub use client::RedditClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Comment, Submission};

/// Read-only access to a subreddit's submissions and their comment trees.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Newest submissions first, at most `limit` of them.
    async fn list_new(&self, subreddit: &str, limit: usize) -> Result<Vec<Submission>>;

    async fn fetch_submission(&self, id: &str) -> Result<Submission>;

    /// The complete comment tree of a submission, every placeholder expanded, flattened.
    async fn fetch_comments(&self, id: &str) -> Result<Vec<Comment>>;
}
