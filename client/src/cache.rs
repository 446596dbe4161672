//! In-memory TTL cache for API responses.
//!
//! One instance is constructed per running client and handed to whoever
//! needs it; clones share the same entries. Entries live only as long as
//! the process.

use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use hospital_blog_shared::Article;
use parking_lot::Mutex;

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl ManualClock {
    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Cache slot. Renders as `posts` or `post-<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The full listing.
    Posts,
    /// One article by id.
    Post(String),
}

impl CacheKey {
    /// Key for a single article.
    pub fn post(id: impl Into<String>) -> Self {
        Self::Post(id.into())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posts => f.write_str("posts"),
            Self::Post(id) => write!(f, "post-{id}"),
        }
    }
}

/// Raw server data as fetched. Derived fields are never cached.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedPayload {
    /// Listing.
    Posts(Arc<Vec<Article>>),
    /// Single article.
    Post(Arc<Article>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: CachedPayload,
    captured_at: Instant,
}

/// Process-wide response cache with a fixed TTL.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<Mutex<HashMap<CacheKey, CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Cache on the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Cache on an injected clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Freshness window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh payload for `key`, or `None`. Expired entries are dropped.
    pub fn get(&self, key: &CacheKey) -> Option<CachedPayload> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.captured_at) < self.ttl => {
                tracing::debug!(%key, "cache hit");
                Some(entry.payload.clone())
            },
            Some(_) => {
                entries.remove(key);
                tracing::debug!(%key, "cache entry expired");
                None
            },
            None => {
                tracing::debug!(%key, "cache miss");
                None
            },
        }
    }

    /// Store `payload` under `key` stamped with the current time.
    pub fn set(&self, key: CacheKey, payload: CachedPayload) {
        let captured_at = self.clock.now();
        self.entries.lock().insert(
            key,
            CacheEntry {
                payload,
                captured_at,
            },
        );
    }

    /// Drop `key` if present.
    pub fn invalidate(&self, key: &CacheKey) {
        if self.entries.lock().remove(key).is_some() {
            tracing::debug!(%key, "cache entry invalidated");
        }
    }

    /// Fresh listing, if cached.
    pub fn posts(&self) -> Option<Arc<Vec<Article>>> {
        match self.get(&CacheKey::Posts)? {
            CachedPayload::Posts(posts) => Some(posts),
            CachedPayload::Post(_) => None,
        }
    }

    /// Fresh article `id`, if cached.
    pub fn post(&self, id: &str) -> Option<Arc<Article>> {
        match self.get(&CacheKey::post(id))? {
            CachedPayload::Post(post) => Some(post),
            CachedPayload::Posts(_) => None,
        }
    }
}
