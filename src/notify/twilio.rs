use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::TwilioConfig;
use crate::error::{AppError, Result};

use super::Notifier;

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: Option<String>,
}

/// Sends SMS through the Twilio Messages resource.
pub struct TwilioNotifier {
    client: Client,
    messages_url: Url,
    account_sid: String,
    auth_token: String,
    from_num: String,
    to_num: String,
}

impl TwilioNotifier {
    pub fn new(config: &TwilioConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Notification(e.to_string()))?;

        let messages_url = Url::parse(&format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_url.trim_end_matches('/'),
            config.account_sid
        ))?;

        Ok(Self {
            client,
            messages_url,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_num: config.from_num.clone(),
            to_num: config.to_num.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(&self, body: &str) -> Result<()> {
        tracing::info!("Sending notification...");

        let response = self
            .client
            .post(self.messages_url.clone())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", self.to_num.as_str()), ("From", self.from_num.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| AppError::Notification(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Notification(format!("HTTP {status}: {error_text}")));
        }

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|e| AppError::Notification(e.to_string()))?;
        tracing::debug!("Notification accepted as {}", message.sid.unwrap_or_default());
        Ok(())
    }
}
