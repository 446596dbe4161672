//! Markdown and file helpers shared by the write commands.

use std::path::Path;

use anyhow::{Context, Result};
use gray_matter::{engine::YAML, Matter};
use hospital_blog_shared::{ArticleDraft, ArticleStatus, TagRef};
use serde::Deserialize;

/// YAML frontmatter accepted by `save` and `publish`.
#[derive(Debug, Default, Deserialize)]
pub struct Frontmatter {
    /// Existing article id; absent for a new article.
    pub id: Option<String>,
    /// Headline, required.
    pub title: Option<String>,
    /// Listing teaser.
    pub excerpt: Option<String>,
    /// Tag names; the first one is the category.
    pub tags: Option<Vec<String>>,
    /// Already-uploaded image URLs.
    pub images: Option<Vec<String>>,
    /// Cover image URL, placed ahead of `images`.
    pub cover_image: Option<String>,
    /// `draft`, `published` or `archived`.
    pub status: Option<String>,
}

/// Split `content` into its frontmatter and Markdown body.
pub fn parse_markdown(content: &str) -> Result<(Frontmatter, String)> {
    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(content);

    let frontmatter = parsed
        .data
        .map(|data| data.deserialize::<Frontmatter>())
        .transpose()?
        .unwrap_or_default();

    Ok((frontmatter, parsed.content))
}

/// Build an editor draft from a Markdown file's frontmatter and body.
///
/// `id_override` wins over frontmatter `id`. `cover_image` is placed ahead
/// of `images` so it becomes the cover.
pub fn draft_from_markdown(content: &str, id_override: Option<String>) -> Result<ArticleDraft> {
    let (frontmatter, body) = parse_markdown(content)?;
    let title = frontmatter
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .context("frontmatter title is required")?;

    let status = match frontmatter.status.as_deref() {
        Some(raw) => raw.parse::<ArticleStatus>().map_err(anyhow::Error::msg)?,
        None => ArticleStatus::Draft,
    };

    let mut images: Vec<String> = frontmatter.cover_image.into_iter().collect();
    images.extend(frontmatter.images.unwrap_or_default());

    Ok(ArticleDraft {
        id: id_override.or(frontmatter.id),
        title,
        excerpt: frontmatter.excerpt.unwrap_or_default(),
        content: body.trim().to_string(),
        tags: frontmatter
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(TagRef::Name)
            .collect(),
        images,
        status,
    })
}

/// Comma-separated tag list, blanks dropped.
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.to_string())
        .collect()
}

/// MIME type from the file extension.
pub fn guess_image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
