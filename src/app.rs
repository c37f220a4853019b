use crate::config::{Config, RedditConfig};
use crate::db::Repository;
use crate::error::Result;
use crate::notify::Notifier;
use crate::reddit::{FeedSource, RedditClient};
use crate::report::build_report;
use crate::scraper::Scraper;

pub const FATAL_ALERT: &str = "Encountered a fatal error!";

/// One scrape run: the feed session and the database connection it owns.
pub struct App<'a> {
    feed: Box<dyn FeedSource>,
    repository: Repository,
    notifier: &'a dyn Notifier,
    reddit: RedditConfig,
}

impl<'a> App<'a> {
    pub async fn bootstrap(config: &Config, notifier: &'a dyn Notifier) -> Result<Self> {
        tracing::info!("Setting-up Reddit...");
        let feed = RedditClient::connect(&config.reddit).await?;
        tracing::info!("Pointing to r/{}...", config.reddit.target_subreddit);

        tracing::info!("Opening database at {}...", config.database.path);
        let repository = Repository::new(&config.database.path).await?;

        Ok(Self::new(Box::new(feed), repository, notifier, config.reddit.clone()))
    }

    pub fn new(
        feed: Box<dyn FeedSource>,
        repository: Repository,
        notifier: &'a dyn Notifier,
        reddit: RedditConfig,
    ) -> Self {
        Self {
            feed,
            repository,
            notifier,
            reddit,
        }
    }

    /// Scrapes, reports, then closes the database. Returns the number of submissions archived.
    pub async fn run(self) -> Result<usize> {
        let scraper = Scraper::new(self.feed.as_ref(), &self.repository, &self.reddit);
        let scraped = scraper
            .scrape_unscraped_submissions(self.reddit.min_submission_age)
            .await?;

        let report = build_report(&self.repository, scraper.subreddit(), scraped).await?;
        self.notifier.send(&report).await?;

        tracing::info!("Closing database connection...");
        self.repository.close().await?;
        tracing::info!("DONE!");
        Ok(scraped)
    }
}

pub async fn run(config: &Config, notifier: &dyn Notifier) -> Result<usize> {
    let app = App::bootstrap(config, notifier).await?;
    app.run().await
}

/// Top-level error boundary: one alert per failed run.
///
/// If the alert cannot be delivered, its error replaces the original one,
/// which has already been logged by then.
pub async fn alert_on_failure<T>(outcome: Result<T>, notifier: &dyn Notifier) -> Result<T> {
    let err = match outcome {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let kind = err.kind().as_str();
    tracing::error!(kind, "Fatal error: {}", err);
    notifier
        .send(&format!("{FATAL_ALERT} ({kind} error)"))
        .await?;
    Err(err)
}
