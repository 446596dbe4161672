//! View-level article state and its reconciliation with the server.
//!
//! Every operation catches its own failure, records a dismissible message and
//! picks a recovery path: keep stale data on a failed load, re-fetch after a
//! failed delete, keep the editor open after a failed save. The error is also
//! returned so callers can branch on it.

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use hospital_blog_shared::{Article, ArticleDraft, ArticleStatus, ArticleView, PostPayload};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    api::BlogApi,
    cache::{CacheKey, CachedPayload, ResponseCache},
    config::ClientConfig,
    error::{RequestError, TransportError},
    filter::{ArticleFilter, CategoryFilter, FilteredArticles, StatusFilter},
    request::RequestClient,
    transport::ReqwestTransport,
};

/// Loading indicator state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing loaded yet.
    #[default]
    Idle,
    /// First load in progress.
    Loading,
    /// Load re-issued through [`ArticleStore::retry`].
    Retrying,
    /// A list is present (possibly stale after a failed refresh).
    Ready,
}

/// Which screen the view is on.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewMode {
    /// Article listing.
    #[default]
    Listing,
    /// Editor open on this draft.
    Editing(ArticleDraft),
}

/// Lets another task tear the view down while an operation is pending.
#[derive(Debug, Clone)]
pub struct UnmountHandle(CancellationToken);

impl UnmountHandle {
    /// Mark the view gone; pending requests abort and late results are
    /// discarded.
    pub fn unmount(&self) {
        self.0.cancel();
    }
}

/// In-memory article list for the current view.
pub struct ArticleStore {
    api: BlogApi,
    cache: ResponseCache,
    lifetime: CancellationToken,
    articles: Arc<[ArticleView]>,
    revision: u64,
    filter: ArticleFilter,
    filtered: FilteredArticles,
    load_state: watch::Sender<LoadState>,
    mode: ViewMode,
    error: Option<String>,
}

impl ArticleStore {
    /// Store over `api`, sharing `cache` with any other consumer.
    pub fn new(api: BlogApi, cache: ResponseCache) -> Self {
        Self {
            api,
            cache,
            lifetime: CancellationToken::new(),
            articles: Arc::from(Vec::new()),
            revision: 0,
            filter: ArticleFilter::default(),
            filtered: FilteredArticles::default(),
            load_state: watch::Sender::new(LoadState::Idle),
            mode: ViewMode::Listing,
            error: None,
        }
    }

    /// Wire the reqwest transport, request client and cache from `config`.
    pub fn from_config(config: ClientConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        let client = RequestClient::new(transport, config.retry);
        let cache = ResponseCache::new(config.cache_ttl);
        Ok(Self::new(BlogApi::new(client, config), cache))
    }

    /// Shared response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Endpoint bindings.
    pub fn api(&self) -> &BlogApi {
        &self.api
    }

    /// All loaded articles, newest first.
    pub fn articles(&self) -> Arc<[ArticleView]> {
        Arc::clone(&self.articles)
    }

    /// Loaded articles passing the current filter. The same `Arc` is
    /// returned until the list or the filter changes.
    pub fn filtered(&self) -> Arc<[ArticleView]> {
        self.filtered.items()
    }

    /// Current filter.
    pub fn filter(&self) -> &ArticleFilter {
        &self.filter
    }

    /// Distinct derived categories in the loaded list.
    pub fn categories(&self) -> Vec<String> {
        self.articles
            .iter()
            .map(|view| view.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Loading indicator.
    pub fn load_state(&self) -> LoadState {
        *self.load_state.borrow()
    }

    /// Watch the loading indicator while an operation holds the store.
    pub fn subscribe_load_state(&self) -> watch::Receiver<LoadState> {
        self.load_state.subscribe()
    }

    /// Current screen.
    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    /// Last failure message, until dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Clear the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Handle for tearing the view down from elsewhere.
    pub fn unmount_handle(&self) -> UnmountHandle {
        UnmountHandle(self.lifetime.clone())
    }

    /// Tear the view down.
    pub fn unmount(&self) {
        self.lifetime.cancel();
    }

    /// Whether results may still be applied.
    pub fn is_live(&self) -> bool {
        !self.lifetime.is_cancelled()
    }

    /// Replace the search text.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filter.search_query = query.into();
        self.refresh_filtered();
    }

    /// Replace the category selector.
    pub fn set_category_filter(&mut self, category: CategoryFilter) {
        self.filter.category = category;
        self.refresh_filtered();
    }

    /// Replace the status selector.
    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filter.status = status;
        self.refresh_filtered();
    }

    /// Replace every selector at once.
    pub fn set_filter(&mut self, filter: ArticleFilter) {
        self.filter = filter;
        self.refresh_filtered();
    }

    /// Open the editor on an empty draft.
    pub fn begin_create(&mut self) {
        self.mode = ViewMode::Editing(ArticleDraft::default());
    }

    /// Close the editor without saving.
    pub fn cancel_edit(&mut self) {
        self.mode = ViewMode::Listing;
    }

    /// Load the listing, from cache when fresh.
    ///
    /// On failure the previously loaded list is kept.
    pub async fn load_all(&mut self) -> Result<(), RequestError> {
        self.load_posts(LoadState::Loading).await
    }

    /// [`Self::load_all`] with the retrying indicator. Clears the previous
    /// error first.
    pub async fn retry(&mut self) -> Result<(), RequestError> {
        self.error = None;
        self.load_posts(LoadState::Retrying).await
    }

    /// Load one article and open it in the editor.
    pub async fn load_one(&mut self, id: &str) -> Result<ArticleView, RequestError> {
        let key = CacheKey::post(id);
        let article = match self.cache.post(id) {
            Some(article) => article,
            None => match self.api.get_post(id, &self.lifetime).await {
                Ok(article) => {
                    let article = Arc::new(article);
                    self.cache.set(key, CachedPayload::Post(Arc::clone(&article)));
                    article
                },
                Err(err) => return Err(self.fail("load article", err)),
            },
        };

        if !self.is_live() {
            return Err(RequestError::Cancelled);
        }
        let view = ArticleView::derive(Article::clone(&article));
        self.mode = ViewMode::Editing(ArticleDraft::from(&view.article));
        Ok(view)
    }

    /// Delete on the server, then drop the article locally.
    ///
    /// Local removal happens only after the server confirms. On failure the
    /// listing is re-fetched to resynchronize. A confirmed delete is `Ok`
    /// even if the view was unmounted meanwhile.
    pub async fn delete(&mut self, id: &str) -> Result<(), RequestError> {
        match self.api.delete_post(id, &self.lifetime).await {
            Ok(()) => {
                self.cache.invalidate(&CacheKey::Posts);
                self.cache.invalidate(&CacheKey::post(id));
                if !self.is_live() {
                    return Ok(());
                }
                let remaining: Vec<ArticleView> = self
                    .articles
                    .iter()
                    .filter(|view| view.id() != id)
                    .cloned()
                    .collect();
                self.replace_articles(remaining);
                tracing::info!(id, "article deleted");
                Ok(())
            },
            Err(err) => {
                let err = self.fail("delete article", err);
                if self.is_live() {
                    // Server state is unknown; refetch rather than trust the cache.
                    self.cache.invalidate(&CacheKey::Posts);
                    let message = self.error.take();
                    let _ = self.load_all().await;
                    if self.is_live() {
                        // Report the delete, not the resync.
                        self.error = message;
                    }
                }
                Err(err)
            },
        }
    }

    /// Create or update `draft` keeping its status.
    ///
    /// Once the server accepts the write this returns `Ok`; an unmounted view
    /// only skips the reload.
    pub async fn save(&mut self, draft: ArticleDraft) -> Result<(), RequestError> {
        let status = draft.status;
        self.persist(draft, status, None, "save article").await
    }

    /// Create or update `draft` as published now.
    pub async fn publish(&mut self, draft: ArticleDraft) -> Result<(), RequestError> {
        self.persist(draft, ArticleStatus::Published, Some(Utc::now()), "publish article")
            .await
    }

    async fn persist(
        &mut self,
        draft: ArticleDraft,
        status: ArticleStatus,
        published_at: Option<DateTime<Utc>>,
        action: &str,
    ) -> Result<(), RequestError> {
        let payload = PostPayload::from_draft(&draft, &self.api.config().author_id, status, published_at);
        let result = match draft.id.as_deref() {
            Some(id) => self.api.update_post(id, &payload, &self.lifetime).await,
            None => self.api.create_post(&payload, &self.lifetime).await,
        };

        if let Err(err) = result {
            let err = self.fail(action, err);
            if self.is_live() {
                self.mode = ViewMode::Editing(draft);
            }
            return Err(err);
        }

        self.cache.invalidate(&CacheKey::Posts);
        if let Some(id) = draft.id.as_deref() {
            self.cache.invalidate(&CacheKey::post(id));
        }
        tracing::info!(id = ?draft.id, %status, "article persisted");
        if !self.is_live() {
            return Ok(());
        }

        // The write is committed; a failed reload only leaves a stale list.
        let _ = self.load_all().await;
        if self.is_live() {
            self.mode = ViewMode::Listing;
        }
        Ok(())
    }

    async fn load_posts(&mut self, indicator: LoadState) -> Result<(), RequestError> {
        self.load_state.send_replace(indicator);

        let posts = match self.cache.posts() {
            Some(posts) => posts,
            None => match self.api.list_posts(&self.lifetime).await {
                Ok(posts) => {
                    let posts = Arc::new(posts);
                    self.cache.set(CacheKey::Posts, CachedPayload::Posts(Arc::clone(&posts)));
                    posts
                },
                Err(err) => {
                    let err = self.fail("load articles", err);
                    if self.is_live() {
                        let settled = if self.articles.is_empty() {
                            LoadState::Idle
                        } else {
                            LoadState::Ready
                        };
                        self.load_state.send_replace(settled);
                    }
                    return Err(err);
                },
            },
        };

        if !self.is_live() {
            return Err(RequestError::Cancelled);
        }
        let views = posts.iter().cloned().map(ArticleView::derive).collect();
        self.replace_articles(views);
        self.load_state.send_replace(LoadState::Ready);
        tracing::info!(count = self.articles.len(), "articles loaded");
        Ok(())
    }

    fn replace_articles(&mut self, mut views: Vec<ArticleView>) {
        // Stable, so equal timestamps keep server order.
        views.sort_by(|a, b| b.recency().cmp(&a.recency()));
        self.articles = Arc::from(views);
        self.revision += 1;
        self.refresh_filtered();
    }

    fn refresh_filtered(&mut self) {
        self.filtered
            .refresh(self.revision, &self.articles, &self.filter);
    }

    fn fail(&mut self, action: &str, err: RequestError) -> RequestError {
        if self.is_live() {
            tracing::warn!(action, error = %err, "operation failed");
            self.error = Some(format!("Failed to {action}: {err}"));
        } else {
            tracing::debug!(action, error = %err, "dropping result for unmounted view");
        }
        err
    }
}

impl Drop for ArticleStore {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
