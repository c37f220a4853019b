mod app;
mod config;
mod db;
mod error;
mod models;
mod notify;
mod reddit;
mod report;
mod scraper;

use config::Config;
use error::Result;
use notify::TwilioNotifier;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging (info by default, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Nothing can be alerted before the notification channel is configured
    let config = Config::load().inspect_err(|e| tracing::error!("{}", e))?;
    let notifier = TwilioNotifier::new(&config.twilio)?;

    let outcome = app::run(&config, &notifier).await;
    let scraped = app::alert_on_failure(outcome, &notifier).await?;

    tracing::debug!("Run finished with {} new submissions", scraped);
    Ok(())
}
