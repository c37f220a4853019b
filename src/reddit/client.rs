use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use url::Url;

use crate::config::RedditConfig;
use crate::error::{AppError, Result};
use crate::models::{Comment, Submission};

use super::tree::CommentTree;
use super::types::{Listing, MoreChildrenResponse, Thing, TokenResponse};
use super::FeedSource;

/// Reddit never returns more than this many children per listing page.
const PAGE_SIZE: usize = 100;
/// Upper bound on ids accepted by a single `/api/morechildren` call.
const MORE_CHILDREN_BATCH: usize = 100;
const COMMENTS_LIMIT: &str = "500";
/// Refresh the token this long before Reddit would reject it.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Application-only OAuth session against the Reddit API.
pub struct RedditClient {
    client: Client,
    auth_url: Url,
    api_url: Url,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    /// Builds the session and authenticates immediately, so bad credentials fail the run up front.
    pub async fn connect(config: &RedditConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        let reddit = Self {
            client,
            auth_url: base_url(&config.auth_url)?,
            api_url: base_url(&config.api_url)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Mutex::new(None),
        };

        reddit.bearer().await?;
        tracing::info!("Authenticated with Reddit as application {}", reddit.client_id);
        Ok(reddit)
    }

    async fn bearer(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        let expired = token
            .as_ref()
            .map_or(true, |t| t.expires_at <= Instant::now());
        if expired {
            *token = Some(self.request_token().await?);
        }

        token
            .as_ref()
            .map(|t| t.value.clone())
            .ok_or_else(|| AppError::RedditApi("no access token".to_string()))
    }

    async fn request_token(&self) -> Result<AccessToken> {
        tracing::debug!("Requesting Reddit access token");
        let response = self
            .client
            .post(self.auth_url.join("api/v1/access_token")?)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::RedditApi(format!(
                "authentication failed: HTTP {}",
                response.status()
            )));
        }

        let body: TokenResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(AppError::RedditApi(format!("authentication failed: {error}")));
        }
        let value = body
            .access_token
            .ok_or_else(|| AppError::RedditApi("token response had no access_token".to_string()))?;

        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(3600));
        Ok(AccessToken {
            value,
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_SLACK),
        })
    }

    /// A path built from listing data that does not form a URL is a feed failure, not bad config.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| AppError::RedditApi(format!("invalid request path /{path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(path)?;
        let token = self.bearer().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .query(&[("raw_json", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::RedditApi(format!(
                "HTTP {} from /{}",
                response.status(),
                path
            )));
        }

        Ok(response.json().await?)
    }

    async fn expand_more_children(
        &self,
        tree: &mut CommentTree,
        link_id: &str,
        children: &[String],
    ) -> Result<()> {
        for chunk in children.chunks(MORE_CHILDREN_BATCH) {
            let response: MoreChildrenResponse = self
                .get_json(
                    "api/morechildren",
                    &[
                        ("api_type", "json".to_string()),
                        ("link_id", link_id.to_string()),
                        ("children", chunk.join(",")),
                        ("limit_children", "false".to_string()),
                    ],
                )
                .await?;

            if !response.json.errors.is_empty() {
                return Err(AppError::RedditApi(format!(
                    "morechildren failed: {:?}",
                    response.json.errors
                )));
            }
            if let Some(data) = response.json.data {
                tree.absorb(data.things);
            }
        }
        Ok(())
    }

    /// "Continue this thread": re-request the submission focused on the deep comment.
    async fn expand_thread(&self, tree: &mut CommentTree, id: &str, parent_id: &str) -> Result<()> {
        let Some(comment_id) = parent_id.strip_prefix("t1_") else {
            return Ok(());
        };

        let listings: Vec<Listing> = self
            .get_json(
                &format!("comments/{id}/_/{comment_id}"),
                &[("limit", COMMENTS_LIMIT.to_string())],
            )
            .await?;
        if let Some(comments) = listings.into_iter().nth(1) {
            tree.absorb(comments.data.children);
        }
        Ok(())
    }
}

#[async_trait]
impl FeedSource for RedditClient {
    async fn list_new(&self, subreddit: &str, limit: usize) -> Result<Vec<Submission>> {
        let path = format!("r/{subreddit}/new");
        let mut submissions = Vec::new();
        let mut after: Option<String> = None;

        while submissions.len() < limit {
            let page = (limit - submissions.len()).min(PAGE_SIZE);
            let mut query = vec![("limit", page.to_string())];
            if let Some(after) = &after {
                query.push(("after", after.clone()));
            }

            let listing: Listing = self.get_json(&path, &query).await?;
            let fetched = listing.data.children.len();
            submissions.extend(listing.data.children.into_iter().filter_map(|thing| match thing {
                Thing::Link(link) => Some(Submission::from(*link)),
                _ => None,
            }));

            match listing.data.after {
                Some(next) if fetched > 0 => after = Some(next),
                _ => break,
            }
        }

        submissions.truncate(limit);
        tracing::debug!("Listed {} submissions from r/{}", submissions.len(), subreddit);
        Ok(submissions)
    }

    async fn fetch_submission(&self, id: &str) -> Result<Submission> {
        let listing: Listing = self.get_json(&format!("by_id/t3_{id}"), &[]).await?;

        listing
            .data
            .children
            .into_iter()
            .find_map(|thing| match thing {
                Thing::Link(link) => Some(Submission::from(*link)),
                _ => None,
            })
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    async fn fetch_comments(&self, id: &str) -> Result<Vec<Comment>> {
        let link_id = format!("t3_{id}");
        let listings: Vec<Listing> = self
            .get_json(&format!("comments/{id}"), &[("limit", COMMENTS_LIMIT.to_string())])
            .await?;

        let comments = listings.into_iter().nth(1).ok_or_else(|| {
            AppError::from(anyhow::anyhow!("comments response for {} had no comment listing", link_id))
        })?;

        let mut tree = CommentTree::new();
        tree.absorb(comments.data.children);

        while let Some(more) = tree.next_pending() {
            if more.children.is_empty() {
                self.expand_thread(&mut tree, id, &more.parent_id).await?;
            } else {
                self.expand_more_children(&mut tree, &link_id, &more.children)
                    .await?;
            }
        }

        tracing::debug!("Collected {} comments for {}", tree.len(), link_id);
        Ok(tree.into_comments())
    }
}

/// `Url::join` drops the last path segment unless the base ends with a slash.
fn base_url(raw: &str) -> Result<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}
