//! Editor working model and its mapping onto the persisted API schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Article, ArticleStatus};

/// Author used until real identity is wired in.
pub const PLACEHOLDER_AUTHOR_ID: &str = "1";

/// A tag as the editor holds it: either a bare name or a tag-picker object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    /// `"Cardiology"`
    Name(String),
    /// `{ "name": "Cardiology", ... }`
    Object {
        /// Display name.
        name: String,
    },
}

impl TagRef {
    /// Flatten into a trimmed name.
    pub fn into_name(self) -> String {
        match self {
            Self::Name(name) => name.trim().to_string(),
            Self::Object {
                name,
            } => name.trim().to_string(),
        }
    }
}

impl From<&str> for TagRef {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

/// What the editor form is working on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    /// Present when editing an existing post.
    #[serde(default)]
    pub id: Option<String>,
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Listing teaser.
    #[serde(default)]
    pub excerpt: String,
    /// Editor content; becomes `body` on the wire.
    #[serde(default)]
    pub content: String,
    /// Selected tags.
    #[serde(default)]
    pub tags: Vec<TagRef>,
    /// Uploaded image URLs; the first one becomes the cover.
    #[serde(default)]
    pub images: Vec<String>,
    /// Status the draft currently carries.
    #[serde(default)]
    pub status: ArticleStatus,
}

impl From<&Article> for ArticleDraft {
    fn from(article: &Article) -> Self {
        Self {
            id: Some(article.id.clone()),
            title: article.title.clone(),
            excerpt: article.excerpt.clone(),
            content: article.body.clone(),
            tags: article.tags.iter().cloned().map(TagRef::Name).collect(),
            images: article.cover_image.iter().cloned().collect(),
            status: article.status,
        }
    }
}

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPayload {
    /// Headline.
    pub title: String,
    /// Listing teaser.
    pub excerpt: String,
    /// Article body.
    pub body: String,
    /// First uploaded image, or an empty string.
    pub cover_image: String,
    /// Plain tag names.
    pub tags: Vec<String>,
    /// Author reference.
    pub author_id: String,
    /// Status stamped by the caller.
    pub status: ArticleStatus,
    /// Only sent when publishing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl PostPayload {
    /// Map an editor draft onto the persisted schema.
    pub fn from_draft(
        draft: &ArticleDraft,
        author_id: &str,
        status: ArticleStatus,
        published_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: draft.title.trim().to_string(),
            excerpt: draft.excerpt.trim().to_string(),
            body: draft.content.clone(),
            cover_image: draft.images.first().cloned().unwrap_or_default(),
            tags: draft
                .tags
                .iter()
                .cloned()
                .map(TagRef::into_name)
                .filter(|name| !name.is_empty())
                .collect(),
            author_id: author_id.to_string(),
            status,
            published_at,
        }
    }
}
