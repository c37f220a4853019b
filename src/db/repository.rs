use std::collections::HashSet;

use rusqlite::params;
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Comment, Submission, StoreStats};

use super::schema::{PRAGMAS, SCHEMA};

const WORDS_IN_SUBMISSIONS: &str =
    "SELECT COALESCE(SUM(LENGTH(body) - LENGTH(REPLACE(body, ' ', '')) + 1), 0) FROM submissions";
const WORDS_IN_COMMENTS: &str =
    "SELECT COALESCE(SUM(LENGTH(body) - LENGTH(REPLACE(body, ' ', '')) + 1), 0) FROM comments";

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        let repository = Self { conn };
        repository.ensure_schema().await?;
        Ok(repository)
    }

    /// Creates both tables if absent. Safe to call any number of times.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute_batch(PRAGMAS)?;
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    // Submission operations

    pub async fn stored_submission_ids(&self) -> Result<HashSet<String>> {
        let ids = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT submission_id FROM submissions")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<HashSet<_>, _>>()?;
                Ok(ids)
            })
            .await?;
        Ok(ids)
    }

    /// Plain insert in autocommit mode; a duplicate fullname is an error.
    pub async fn insert_submission(&self, submission: Submission) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO submissions (submission_fullname, submission_id, title, author,
                                                num_comments, score, upvote_ratio, created_utc,
                                                permalink, body)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                    params![
                        submission.fullname,
                        submission.id,
                        submission.title,
                        submission.author,
                        submission.num_comments,
                        submission.score,
                        submission.upvote_ratio,
                        submission.created_utc,
                        submission.permalink,
                        submission.body,
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // Comment operations

    /// Inserts the whole batch in one transaction. Either every row lands or none do.
    pub async fn insert_comments(&self, comments: Vec<Comment>) -> Result<usize> {
        if comments.is_empty() {
            return Ok(0);
        }

        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        r#"INSERT INTO comments (comment_fullname, comment_id, submission_fullname,
                                                 parent_id, author, score, created_utc, edited,
                                                 permalink, body)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                    )?;
                    for comment in &comments {
                        stmt.execute(params![
                            comment.fullname,
                            comment.id,
                            comment.submission_fullname,
                            comment.parent_id,
                            comment.author,
                            comment.score,
                            comment.created_utc,
                            comment.edited,
                            comment.permalink,
                            comment.body,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(comments.len())
            })
            .await?;
        Ok(inserted)
    }

    // Reporting

    pub async fn stats(&self) -> Result<StoreStats> {
        let stats = self
            .conn
            .call(|conn| {
                let count = |sql: &str| conn.query_row(sql, [], |row| row.get::<_, i64>(0));
                Ok(StoreStats {
                    submissions: count("SELECT COUNT(*) FROM submissions")?,
                    comments: count("SELECT COUNT(*) FROM comments")?,
                    comment_authors: count("SELECT COUNT(DISTINCT author) FROM comments")?,
                    words: count(WORDS_IN_SUBMISSIONS)? + count(WORDS_IN_COMMENTS)?,
                })
            })
            .await?;
        Ok(stats)
    }
}
