//! Wire shapes of the Reddit JSON API, trimmed to the fields the archive keeps.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{Comment, Submission};

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Thing {
    #[serde(rename = "t1")]
    Comment(Box<RawComment>),
    #[serde(rename = "t3")]
    Link(Box<RawLink>),
    #[serde(rename = "more")]
    More(RawMore),
}

#[derive(Debug, Deserialize)]
pub struct RawLink {
    pub name: String,
    pub id: String,
    pub title: String,
    pub author: String,
    pub num_comments: i64,
    pub score: i64,
    #[serde(default)]
    pub upvote_ratio: f64,
    pub created_utc: f64,
    pub permalink: String,
    #[serde(default)]
    pub selftext: String,
}

#[derive(Debug, Deserialize)]
pub struct RawComment {
    pub name: String,
    pub id: String,
    pub link_id: String,
    pub parent_id: String,
    pub author: String,
    pub score: i64,
    pub created_utc: f64,
    /// Edit timestamp; Reddit sends `false` for comments never edited.
    #[serde(default, deserialize_with = "edited_at")]
    pub edited: Option<f64>,
    pub permalink: String,
    #[serde(default)]
    pub body: String,
    /// Leaf comments carry `""` instead of an empty listing.
    #[serde(default, deserialize_with = "nested_replies")]
    pub replies: Option<Listing>,
}

fn edited_at<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64())
}

fn nested_replies<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Listing>, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Reddit sends float seconds. Rounding up keeps `now - created >= min_age`
/// in whole seconds equivalent to the same test on the exact value.
fn whole_seconds(ts: f64) -> i64 {
    ts.ceil() as i64
}

/// A collapsed "load more comments" placeholder. An empty `children` list
/// means "continue this thread": the subtree must be fetched from `parent_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMore {
    pub parent_id: String,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
pub struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
pub struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<Thing>,
}

impl From<RawLink> for Submission {
    fn from(raw: RawLink) -> Self {
        Submission {
            fullname: raw.name,
            id: raw.id,
            title: raw.title,
            author: raw.author,
            num_comments: raw.num_comments,
            score: raw.score,
            upvote_ratio: raw.upvote_ratio,
            created_utc: whole_seconds(raw.created_utc),
            permalink: raw.permalink,
            body: raw.selftext,
        }
    }
}

impl RawComment {
    /// Detaches the nested replies so the node can be stored flat.
    pub fn split(self) -> (Comment, Option<Listing>) {
        let comment = Comment {
            fullname: self.name,
            id: self.id,
            submission_fullname: self.link_id,
            parent_id: self.parent_id,
            author: self.author,
            score: self.score,
            created_utc: whole_seconds(self.created_utc),
            edited: self.edited.map(|ts| ts as i64),
            permalink: self.permalink,
            body: self.body,
        };
        (comment, self.replies)
    }
}
