use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use hb_cli::utils::guess_image_mime;
use hospital_blog_client::{ArticleStore, CancellationToken};

pub async fn run(store: &ArticleStore, file: &Path, mime: Option<String>) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read image {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .context("image path has no file name")?;
    let mime = mime.unwrap_or_else(|| guess_image_mime(file).to_string());

    tracing::info!("Uploading {file_name} ({mime}, {} bytes)", bytes.len());
    let url = store
        .api()
        .upload_image(file_name, &mime, Bytes::from(bytes), &CancellationToken::new())
        .await
        .context("image upload failed")?;
    println!("{url}");
    Ok(())
}
