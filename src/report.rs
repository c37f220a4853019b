use crate::db::Repository;
use crate::error::Result;
use crate::models::StoreStats;

/// Summarises the run and the archive as a short SMS-sized text.
pub async fn build_report(repository: &Repository, subreddit: &str, scraped: usize) -> Result<String> {
    let stats = repository.stats().await?;
    Ok(format_report(subreddit, scraped, &stats))
}

pub fn format_report(subreddit: &str, scraped: usize, stats: &StoreStats) -> String {
    let noun = if scraped == 1 { "submission" } else { "submissions" };
    format!(
        "Scraped {scraped} {noun} from r/{subreddit}.\n\
         Total # submissions:\n{}\n\
         Total # comments:\n{}\n\
         Total # authors:\n{}\n\
         Total # words:\n{}",
        stats.submissions, stats.comments, stats.comment_authors, stats.words
    )
}
