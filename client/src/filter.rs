//! Listing filters. Pure functions over the loaded list; never touch the
//! network.

use std::{convert::Infallible, str::FromStr, sync::Arc};

use hospital_blog_shared::{ArticleStatus, ArticleView};

/// Category selector. `"all"` selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No category restriction.
    #[default]
    All,
    /// Derived category equals this, ignoring case.
    Named(String),
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Named(trimmed.to_string()))
        }
    }
}

/// Status selector. `"all"` selects everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// No status restriction.
    #[default]
    All,
    /// Only this status.
    Only(ArticleStatus),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            trimmed.parse().map(Self::Only)
        }
    }
}

/// Search text plus category and status selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    /// Case-insensitive substring of title or excerpt; blank matches all.
    pub search_query: String,
    /// Category selector.
    pub category: CategoryFilter,
    /// Status selector.
    pub status: StatusFilter,
}

impl ArticleFilter {
    /// Whether `view` passes every selector.
    pub fn matches(&self, view: &ArticleView) -> bool {
        self.matches_search(view) && self.matches_category(view) && self.matches_status(view)
    }

    /// Matching views in input order.
    pub fn apply(&self, articles: &[ArticleView]) -> Vec<ArticleView> {
        articles
            .iter()
            .filter(|view| self.matches(view))
            .cloned()
            .collect()
    }

    fn matches_search(&self, view: &ArticleView) -> bool {
        let needle = self.search_query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        view.article.title.to_lowercase().contains(&needle)
            || view.article.excerpt.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, view: &ArticleView) -> bool {
        match &self.category {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => view.category.eq_ignore_ascii_case(name),
        }
    }

    fn matches_status(&self, view: &ArticleView) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => view.article.status == status,
        }
    }
}

/// Memoized filter output, recomputed only when the list revision or the
/// filter changes.
#[derive(Debug, Clone)]
pub struct FilteredArticles {
    revision: u64,
    filter: ArticleFilter,
    items: Arc<[ArticleView]>,
}

impl Default for FilteredArticles {
    fn default() -> Self {
        Self {
            revision: 0,
            filter: ArticleFilter::default(),
            items: Arc::from(Vec::new()),
        }
    }
}

impl FilteredArticles {
    /// Bring the memo up to date; returns whether it was recomputed.
    pub fn refresh(&mut self, revision: u64, source: &[ArticleView], filter: &ArticleFilter) -> bool {
        if self.revision == revision && &self.filter == filter {
            return false;
        }
        self.items = Arc::from(filter.apply(source));
        self.revision = revision;
        self.filter = filter.clone();
        true
    }

    /// Current result; the same `Arc` until the next recompute.
    pub fn items(&self) -> Arc<[ArticleView]> {
        Arc::clone(&self.items)
    }
}
