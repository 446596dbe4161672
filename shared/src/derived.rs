//! Listing labels computed from the canonical article fields.
//!
//! These are recomputed every time an article enters view state and are
//! never stored on their own.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Article;

/// Category shown when an article has no tags.
pub const DEFAULT_CATEGORY: &str = "General";
/// Publish-date label for articles without `published_at`.
pub const DRAFT_DATE_LABEL: &str = "Draft";
/// Reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// An article plus its derived listing labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleView {
    /// Raw article as fetched.
    #[serde(flatten)]
    pub article: Article,
    /// First tag, or [`DEFAULT_CATEGORY`].
    pub category: String,
    /// Whole minutes, rounded up.
    pub reading_time_minutes: u32,
    /// e.g. `3 min read`.
    pub reading_time_label: String,
    /// e.g. `March 5, 2025`, or [`DRAFT_DATE_LABEL`].
    pub publish_date_label: String,
}

impl ArticleView {
    /// Compute every derived field from `article`.
    pub fn derive(article: Article) -> Self {
        let category = derive_category(&article.tags);
        let reading_time_minutes = estimate_read_time(&article.body);
        let publish_date_label = format_publish_date(article.published_at);
        Self {
            article,
            category,
            reading_time_minutes,
            reading_time_label: format!("{reading_time_minutes} min read"),
            publish_date_label,
        }
    }

    /// Identifier shortcut.
    pub fn id(&self) -> &str {
        &self.article.id
    }

    /// Timestamp the listing is ordered by, newest first.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.article
            .published_at
            .or(self.article.updated_at)
            .or(self.article.created_at)
    }
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self::derive(article)
    }
}

/// First non-blank tag, or [`DEFAULT_CATEGORY`].
pub fn derive_category(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| tag.trim())
        .find(|tag| !tag.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string()
}

/// Minutes to read `body` at [`WORDS_PER_MINUTE`], never less than one.
///
/// Markup from the rich-text editor is not counted as words.
pub fn estimate_read_time(body: &str) -> u32 {
    let words = strip_html_tags(body).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}

/// `March 5, 2025`, or [`DRAFT_DATE_LABEL`] when unpublished.
pub fn format_publish_date(published_at: Option<DateTime<Utc>>) -> String {
    match published_at {
        Some(at) => at.format("%B %-d, %Y").to_string(),
        None => DRAFT_DATE_LABEL.to_string(),
    }
}

fn strip_html_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            },
            _ if !in_tag => out.push(ch),
            _ => {},
        }
    }
    out
}
