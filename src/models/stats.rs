/// Archive-wide aggregates reported after each run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub submissions: i64,
    pub comments: i64,
    pub comment_authors: i64,
    pub words: i64,
}
