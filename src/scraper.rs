use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::RedditConfig;
use crate::db::Repository;
use crate::error::Result;
use crate::models::Submission;
use crate::reddit::FeedSource;

/// Incremental scrape of one subreddit into the archive.
///
/// A submission counts as scraped once its row exists in `submissions`.
/// Discovery only looks at the newest `listing_limit` submissions, so
/// anything that scrolls out of that window before a run is never seen.
pub struct Scraper<'a> {
    feed: &'a dyn FeedSource,
    repository: &'a Repository,
    subreddit: String,
    listing_limit: usize,
    throttle: Duration,
}

impl<'a> Scraper<'a> {
    pub fn new(feed: &'a dyn FeedSource, repository: &'a Repository, config: &RedditConfig) -> Self {
        Self {
            feed,
            repository,
            subreddit: config.target_subreddit.clone(),
            listing_limit: config.listing_limit,
            throttle: config.throttle(),
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Ids of listed submissions at least `min_age` seconds old that are not archived yet.
    pub async fn find_unscraped_submissions(&self, min_age: u64) -> Result<Vec<String>> {
        tracing::info!("Searching for submissions to scrape...");

        let listed = self.feed.list_new(&self.subreddit, self.listing_limit).await?;
        let stored = self.repository.stored_submission_ids().await?;
        let to_scrape = unscraped_ids(&listed, &stored, Utc::now(), min_age);

        tracing::info!("Found {} submissions to scrape.", to_scrape.len());
        Ok(to_scrape)
    }

    /// Archives the submission itself; its comments are a separate step.
    pub async fn scrape_submission(&self, id: &str) -> Result<Submission> {
        let submission = self.feed.fetch_submission(id).await?;
        tracing::info!("Scraping submission: {}", submission.permalink);
        self.repository.insert_submission(submission.clone()).await?;
        Ok(submission)
    }

    /// Archives the full comment tree of an already archived submission.
    /// Nothing is written unless the whole tree was fetched.
    pub async fn scrape_comments(&self, id: &str) -> Result<usize> {
        let comments = self.feed.fetch_comments(id).await?;
        if comments.is_empty() {
            return Ok(0);
        }

        tracing::info!("Scraping {} comments from submission {}", comments.len(), id);
        self.repository.insert_comments(comments).await
    }

    /// Runs one full pass and returns how many submissions were archived.
    pub async fn scrape_unscraped_submissions(&self, min_age: u64) -> Result<usize> {
        let ids = self.find_unscraped_submissions(min_age).await?;
        let total = ids.len();

        for (i, id) in ids.iter().enumerate() {
            tracing::info!("##### Scraping submission {} of {} #####", i + 1, total);
            self.scrape_submission(id).await?;
            self.scrape_comments(id).await?;
            tokio::time::sleep(self.throttle).await;
        }

        Ok(total)
    }
}

/// Set difference of old-enough listed ids and stored ids, sorted and deduplicated.
pub fn unscraped_ids(
    listed: &[Submission],
    stored: &HashSet<String>,
    now: DateTime<Utc>,
    min_age: u64,
) -> Vec<String> {
    let min_age = i64::try_from(min_age).unwrap_or(i64::MAX);

    listed
        .iter()
        .filter(|submission| submission.age_at(now) >= min_age)
        .map(|submission| submission.id.as_str())
        .filter(|id| !stored.contains(*id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::error::AppError;
    use crate::models::Comment;

    pub(crate) fn submission(id: &str, created_utc: i64) -> Submission {
        Submission {
            fullname: format!("t3_{id}"),
            id: id.to_string(),
            title: format!("Post {id}"),
            author: "alice".to_string(),
            num_comments: 0,
            score: 1,
            upvote_ratio: 1.0,
            created_utc,
            permalink: format!("/r/rust/comments/{id}/"),
            body: "a b c".to_string(),
        }
    }

    pub(crate) fn comment(id: &str, submission_id: &str, parent: &str) -> Comment {
        Comment {
            fullname: format!("t1_{id}"),
            id: id.to_string(),
            submission_fullname: format!("t3_{submission_id}"),
            parent_id: parent.to_string(),
            author: format!("u_{id}"),
            score: 1,
            created_utc: 1_700_000_000,
            edited: None,
            permalink: format!("/r/rust/comments/{submission_id}/_/{id}/"),
            body: "hello there".to_string(),
        }
    }

    /// In-memory subreddit. Comment fetches for ids in `broken` fail.
    #[derive(Default)]
    pub(crate) struct FakeFeed {
        pub listing: Vec<Submission>,
        pub comments: HashMap<String, Vec<Comment>>,
        pub broken: HashSet<String>,
        pub fetched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FeedSource for FakeFeed {
        async fn list_new(&self, _subreddit: &str, limit: usize) -> Result<Vec<Submission>> {
            Ok(self.listing.iter().take(limit).cloned().collect())
        }

        async fn fetch_submission(&self, id: &str) -> Result<Submission> {
            self.fetched.lock().unwrap().push(id.to_string());
            self.listing
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(id.to_string()))
        }

        async fn fetch_comments(&self, id: &str) -> Result<Vec<Comment>> {
            if self.broken.contains(id) {
                return Err(AppError::RedditApi("connection reset".to_string()));
            }
            Ok(self.comments.get(id).cloned().unwrap_or_default())
        }
    }

    pub(crate) fn reddit_config() -> RedditConfig {
        RedditConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "scraper-test/1.0".to_string(),
            target_subreddit: "rust".to_string(),
            min_submission_age: 3600,
            listing_limit: 1000,
            throttle_ms: 0,
            auth_url: "http://localhost".to_string(),
            api_url: "http://localhost".to_string(),
        }
    }

    async fn temp_repository() -> (Repository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let repository = Repository::new(dir.path().join("scrape.db").to_str().unwrap())
            .await
            .unwrap();
        (repository, dir)
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_010_000, 0).unwrap()
    }

    #[test]
    fn result_is_listed_minus_stored() {
        let listed: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| submission(id, 0))
            .collect();
        let stored = HashSet::from(["b".to_string(), "d".to_string(), "zz".to_string()]);

        assert_eq!(unscraped_ids(&listed, &stored, now(), 0), ["a", "c"]);
    }

    #[test]
    fn age_cutoff_is_inclusive() {
        let min_age = 600;
        let listed = vec![
            submission("exact", now().timestamp() - 600),
            submission("young", now().timestamp() - 599),
            submission("old", now().timestamp() - 601),
        ];

        let ids = unscraped_ids(&listed, &HashSet::new(), now(), min_age);
        assert_eq!(ids, ["exact", "old"]);
    }

    #[test]
    fn repeated_listing_entries_are_collapsed() {
        let listed = vec![submission("a", 0), submission("a", 0)];
        assert_eq!(unscraped_ids(&listed, &HashSet::new(), now(), 0), ["a"]);
    }

    #[tokio::test]
    async fn find_skips_already_archived_submissions() {
        let (repository, _dir) = temp_repository().await;
        repository.insert_submission(submission("a", 0)).await.unwrap();

        let feed = FakeFeed {
            listing: vec![submission("a", 0), submission("b", 0)],
            ..Default::default()
        };
        let scraper = Scraper::new(&feed, &repository, &reddit_config());

        assert_eq!(scraper.find_unscraped_submissions(0).await.unwrap(), ["b"]);
    }

    #[tokio::test]
    async fn submission_without_comments_writes_no_comment_rows() {
        let (repository, _dir) = temp_repository().await;
        let feed = FakeFeed {
            listing: vec![submission("a", 0)],
            ..Default::default()
        };
        let scraper = Scraper::new(&feed, &repository, &reddit_config());

        scraper.scrape_submission("a").await.unwrap();
        assert_eq!(scraper.scrape_comments("a").await.unwrap(), 0);

        let stats = repository.stats().await.unwrap();
        assert_eq!(stats.submissions, 1);
        assert_eq!(stats.comments, 0);
    }

    #[tokio::test]
    async fn comments_are_archived_after_their_submission() {
        let (repository, _dir) = temp_repository().await;
        let feed = FakeFeed {
            listing: vec![submission("a", 0)],
            comments: HashMap::from([(
                "a".to_string(),
                vec![comment("c1", "a", "t3_a"), comment("c2", "a", "t1_c1")],
            )]),
            ..Default::default()
        };
        let scraper = Scraper::new(&feed, &repository, &reddit_config());

        // Comments alone violate the foreign key.
        assert!(scraper.scrape_comments("a").await.is_err());

        scraper.scrape_submission("a").await.unwrap();
        assert_eq!(scraper.scrape_comments("a").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn failed_comment_fetch_leaves_submission_that_is_not_revisited() {
        let (repository, _dir) = temp_repository().await;
        let feed = FakeFeed {
            listing: vec![submission("a", 0)],
            comments: HashMap::from([("a".to_string(), vec![comment("c1", "a", "t3_a")])]),
            broken: HashSet::from(["a".to_string()]),
            ..Default::default()
        };
        let scraper = Scraper::new(&feed, &repository, &reddit_config());

        assert!(scraper.scrape_unscraped_submissions(0).await.is_err());
        assert_eq!(repository.stats().await.unwrap().comments, 0);
        assert!(scraper.find_unscraped_submissions(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_pass_fetches_each_submission_once() {
        let (repository, _dir) = temp_repository().await;
        let feed = FakeFeed {
            listing: vec![submission("a", 0), submission("b", 0)],
            comments: HashMap::from([("b".to_string(), vec![comment("c1", "b", "t3_b")])]),
            ..Default::default()
        };
        let scraper = Scraper::new(&feed, &repository, &reddit_config());

        assert_eq!(scraper.scrape_unscraped_submissions(0).await.unwrap(), 2);
        assert_eq!(scraper.scrape_unscraped_submissions(0).await.unwrap(), 0);
        assert_eq!(*feed.fetched.lock().unwrap(), ["a", "b"]);
    }
}
