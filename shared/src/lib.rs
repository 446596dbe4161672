//! Data model shared by the hospital blog client and CLI.
//!
//! The remote API is the authority for every field in [`Article`]; nothing in
//! this crate originates identifiers or enforces status transitions.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod derived;
pub mod draft;
pub mod render;

pub use derived::ArticleView;
pub use draft::{ArticleDraft, PostPayload, TagRef};

/// Publication status as reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Not yet visible to readers.
    #[default]
    Draft,
    /// Visible to readers.
    Published,
    /// Retired; terminal in practice.
    Archived,
}

impl ArticleStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown article status `{other}`")),
        }
    }
}

// 完整文章数据模型（服务端返回的原始字段）
/// An article exactly as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Opaque identifier assigned by the API.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Short teaser shown in listings.
    #[serde(default)]
    pub excerpt: String,
    /// Markdown or rich-text HTML.
    #[serde(default)]
    pub body: String,
    /// Current status.
    #[serde(default)]
    pub status: ArticleStatus,
    /// Cover image URL; the API sends an empty string when absent.
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub cover_image: Option<String>,
    /// Tag names in server order.
    #[serde(default, deserialize_with = "deserialize_tag_names")]
    pub tags: Vec<String>,
    /// Author reference.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub author_id: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Publication time, set once the post goes live.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Reader view counter.
    #[serde(default)]
    pub view_count: u64,
}

/// Body of `GET /posts`. Older deployments return a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PostListResponse {
    /// `{ "posts": [...] }`
    Wrapped {
        /// Listed posts.
        posts: Vec<Article>,
    },
    /// `[...]`
    Bare(Vec<Article>),
}

impl PostListResponse {
    /// Unwrap into the article list.
    pub fn into_posts(self) -> Vec<Article> {
        match self {
            Self::Wrapped {
                posts,
            } => posts,
            Self::Bare(posts) => posts,
        }
    }
}

/// Body of `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Public URL of the stored image.
    #[serde(rename = "imgUrl")]
    pub img_url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(i64),
}

impl From<IdRepr> for String {
    fn from(value: IdRepr) -> Self {
        match value {
            IdRepr::Text(text) => text,
            IdRepr::Number(number) => number.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer).map(String::from)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn deserialize_tag_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = Option::<Vec<TagRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(tags
        .into_iter()
        .map(TagRef::into_name)
        .filter(|name| !name.is_empty())
        .collect())
}
