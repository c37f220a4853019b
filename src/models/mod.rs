mod comment;
mod stats;
mod submission;

pub use comment::Comment;
pub use stats::StoreStats;
pub use submission::Submission;
