use anyhow::Result;
use hospital_blog_client::{ArticleFilter, ArticleStore, CategoryFilter, StatusFilter};
use hospital_blog_shared::{render::render_body_html, ArticleView};
use serde::Serialize;

use super::{print_json, surface};
use crate::cli::ListOutputFormat;

#[derive(Serialize)]
struct ArticleListOutput<'a> {
    total: usize,
    categories: Vec<String>,
    posts: &'a [ArticleView],
}

pub async fn list(
    store: &mut ArticleStore,
    search: Option<String>,
    category: CategoryFilter,
    status: StatusFilter,
    format: ListOutputFormat,
) -> Result<()> {
    store.load_all().await.map_err(|err| surface(store, err))?;
    store.set_filter(ArticleFilter {
        search_query: search.unwrap_or_default(),
        category,
        status,
    });

    let posts = store.filtered();
    match format {
        ListOutputFormat::Json => print_json(&ArticleListOutput {
            total: posts.len(),
            categories: store.categories(),
            posts: &posts,
        }),
        ListOutputFormat::Table => {
            println!("{}", format_table(&posts));
            Ok(())
        },
    }
}

pub async fn show(store: &mut ArticleStore, id: &str) -> Result<()> {
    let view = store.load_one(id).await.map_err(|err| surface(store, err))?;
    print_json(&view)
}

pub async fn render(store: &mut ArticleStore, id: &str, asset_base: Option<&str>) -> Result<()> {
    let view = store.load_one(id).await.map_err(|err| surface(store, err))?;
    println!("{}", render_body_html(&view.article.body, asset_base));
    Ok(())
}

pub async fn delete(store: &mut ArticleStore, id: &str) -> Result<()> {
    store.load_all().await.map_err(|err| surface(store, err))?;
    store.delete(id).await.map_err(|err| surface(store, err))?;
    tracing::info!("Deleted article {id}; {} remaining", store.articles().len());
    Ok(())
}

fn format_table(posts: &[ArticleView]) -> String {
    if posts.is_empty() {
        return "(no articles)".to_string();
    }

    let mut output = format!(
        "{:<8} {:<10} {:<16} {:<18} {:<12} {}\n",
        "ID", "STATUS", "CATEGORY", "PUBLISHED", "READ", "TITLE"
    );
    for view in posts {
        output.push_str(&format!(
            "{:<8} {:<10} {:<16} {:<18} {:<12} {}\n",
            view.id(),
            view.article.status,
            view.category,
            view.publish_date_label,
            view.reading_time_label,
            view.article.title
        ));
    }
    output.truncate(output.trim_end().len());
    output
}
