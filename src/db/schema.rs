/// Per-connection setting; SQLite leaves foreign keys unenforced otherwise.
pub const PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub const SCHEMA: &str = r#"
-- submissions table
CREATE TABLE IF NOT EXISTS submissions (
    submission_fullname TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    num_comments INTEGER NOT NULL,
    score INTEGER NOT NULL,
    upvote_ratio REAL NOT NULL,
    created_utc INTEGER NOT NULL,
    permalink TEXT NOT NULL,
    body TEXT NOT NULL,
    time_entered_into_database TEXT NOT NULL DEFAULT (datetime('now'))
);

-- comments table, flat; the tree lives in parent_id
CREATE TABLE IF NOT EXISTS comments (
    comment_fullname TEXT PRIMARY KEY,
    comment_id TEXT NOT NULL,
    submission_fullname TEXT NOT NULL
        REFERENCES submissions(submission_fullname) ON DELETE CASCADE ON UPDATE CASCADE,
    parent_id TEXT NOT NULL,
    author TEXT NOT NULL,
    score INTEGER NOT NULL,
    created_utc INTEGER NOT NULL,
    edited INTEGER,
    permalink TEXT NOT NULL,
    body TEXT NOT NULL,
    time_entered_into_database TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_comments_submission ON comments(submission_fullname);
CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author);
"#;
