mod twilio;

pub use twilio::TwilioNotifier;

use async_trait::async_trait;

use crate::error::Result;

/// Outbound channel for the run report and fatal-error alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, body: &str) -> Result<()>;
}
