pub mod posts;
pub mod upload;
pub mod write_article;

use anyhow::{Context, Result};
use hospital_blog_client::{ArticleStore, ClientConfig, RequestError};
use serde::Serialize;

use crate::cli::{Cli, Commands};

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(api_base) = cli.api_base.as_deref() {
        config = config.rebase(api_base);
    }
    tracing::debug!(api_base = %config.api_base, "using blog api");
    let mut store = ArticleStore::from_config(config).context("failed to build http client")?;

    match cli.command {
        Commands::List {
            search,
            category,
            status,
            format,
        } => posts::list(&mut store, search, category, status, format).await,
        Commands::Show {
            id,
        } => posts::show(&mut store, &id).await,
        Commands::Render {
            id,
            asset_base,
        } => posts::render(&mut store, &id, asset_base.as_deref()).await,
        Commands::Save {
            file,
            id,
            tags,
        } => write_article::run(&mut store, &file, id, tags, false).await,
        Commands::Publish {
            file,
            id,
            tags,
        } => write_article::run(&mut store, &file, id, tags, true).await,
        Commands::Delete {
            id,
        } => posts::delete(&mut store, &id).await,
        Commands::Upload {
            file,
            mime,
        } => upload::run(&store, &file, mime).await,
    }
}

/// Turn a failed store operation into the message the store recorded.
pub(crate) fn surface(store: &ArticleStore, err: RequestError) -> anyhow::Error {
    match store.error() {
        Some(message) => anyhow::anyhow!(message.to_string()),
        None => anyhow::Error::new(err),
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
