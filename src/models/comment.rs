use serde::{Deserialize, Serialize};

/// One node of a submission's comment tree, stored flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub fullname: String,
    pub id: String,
    /// Fullname of the owning submission.
    pub submission_fullname: String,
    /// Fullname of the submission or comment this replies to.
    pub parent_id: String,
    pub author: String,
    pub score: i64,
    pub created_utc: i64,
    /// Unix seconds of the last edit, `None` if never edited.
    pub edited: Option<i64>,
    pub permalink: String,
    pub body: String,
}
