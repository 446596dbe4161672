//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hospital_blog_client::{CategoryFilter, StatusFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListOutputFormat {
    /// Pretty JSON with totals and categories.
    Json,
    /// One row per article.
    Table,
}

#[derive(Parser)]
#[command(name = "hb-cli", version, about = "Hospital blog content management CLI")]
pub struct Cli {
    /// API root, e.g. `https://blog.example.org/api/v1`. Overrides
    /// `HOSPITAL_BLOG_API_BASE`.
    #[arg(long, global = true)]
    pub api_base: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List articles, filtered locally.
    List {
        /// Case-insensitive text matched against title and excerpt.
        #[arg(long)]
        search: Option<String>,
        /// Category name, or `all`.
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        /// `draft`, `published`, `archived`, or `all`.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Output format.
        #[arg(long, value_enum, default_value_t = ListOutputFormat::Json, ignore_case = true)]
        format: ListOutputFormat,
    },
    /// Show one article with its derived fields.
    Show {
        /// Article id.
        id: String,
    },
    /// Print the sanitized HTML a reader would see.
    Render {
        /// Article id.
        id: String,
        /// Base URL for relative image paths.
        #[arg(long)]
        asset_base: Option<String>,
    },
    /// Save a Markdown file under its frontmatter status, `draft` by default
    /// (create, or update with `--id`).
    Save {
        /// Markdown file with YAML frontmatter.
        #[arg(long)]
        file: PathBuf,
        /// Existing article id (overrides frontmatter `id`).
        #[arg(long)]
        id: Option<String>,
        /// Comma-separated tags (overrides frontmatter `tags`).
        #[arg(long)]
        tags: Option<String>,
    },
    /// Publish a Markdown file (create, or update with `--id`).
    Publish {
        /// Markdown file with YAML frontmatter.
        #[arg(long)]
        file: PathBuf,
        /// Existing article id (overrides frontmatter `id`).
        #[arg(long)]
        id: Option<String>,
        /// Comma-separated tags (overrides frontmatter `tags`).
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete an article.
    Delete {
        /// Article id.
        id: String,
    },
    /// Upload an image and print its URL.
    Upload {
        /// Image file path.
        file: PathBuf,
        /// MIME type (guessed from the extension when omitted).
        #[arg(long)]
        mime: Option<String>,
    },
}
