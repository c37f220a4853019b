use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A top-level post as archived in the `submissions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Globally unique `t3_`-prefixed name; the table's primary key.
    pub fullname: String,
    /// Subreddit-local base36 id.
    pub id: String,
    pub title: String,
    pub author: String,
    pub num_comments: i64,
    pub score: i64,
    pub upvote_ratio: f64,
    /// Unix seconds.
    pub created_utc: i64,
    pub permalink: String,
    pub body: String,
}

impl Submission {
    /// Whole seconds elapsed between creation and `now`. `created_utc` is
    /// rounded up from Reddit's float, so this never overstates the age.
    pub fn age_at(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp() - self.created_utc
    }
}
