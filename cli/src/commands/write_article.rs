use std::{fs, path::Path};

use anyhow::{Context, Result};
use hb_cli::utils::{draft_from_markdown, parse_tags};
use hospital_blog_client::ArticleStore;
use hospital_blog_shared::TagRef;

use super::surface;

pub async fn run(
    store: &mut ArticleStore,
    file: &Path,
    id: Option<String>,
    tags: Option<String>,
    publish: bool,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("failed to read markdown {}", file.display()))?;
    let mut draft = draft_from_markdown(&content, id)
        .with_context(|| format!("invalid article file {}", file.display()))?;

    if let Some(tags) = tags {
        draft.tags = parse_tags(&tags).into_iter().map(TagRef::Name).collect();
    }

    let title = draft.title.clone();
    let updating = draft.id.clone();
    let result = if publish {
        store.publish(draft).await
    } else {
        store.save(draft).await
    };
    result.map_err(|err| surface(store, err))?;

    let action = if publish { "Published" } else { "Saved" };
    match updating {
        Some(id) => tracing::info!("{action} article {id}: {title}"),
        None => tracing::info!("{action} new article: {title}"),
    }
    Ok(())
}
