//! Client settings read from `HOSPITAL_BLOG_*` environment variables.

use std::{env, time::Duration};

use hospital_blog_shared::draft::PLACEHOLDER_AUTHOR_ID;

/// Default API root when `HOSPITAL_BLOG_API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api/v1";
/// Overall deadline for one logical request, retries included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
/// Attempts per logical request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Backoff before retry `n` is `base * 2^n`.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);
/// Freshness window of cached responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Retry and timeout settings for `RequestClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per logical request, at least one.
    pub max_attempts: u32,
    /// Overall deadline covering every attempt and backoff.
    pub timeout: Duration,
    /// Unit of the exponential backoff.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }
}

/// Everything the client needs to reach the blog API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://host/api/v1`, without trailing slash.
    pub api_base: String,
    /// Image upload endpoint.
    pub upload_url: String,
    /// Author stamped on outgoing posts.
    pub author_id: String,
    /// Request resilience settings.
    pub retry: RetryPolicy,
    /// Response cache freshness window.
    pub cache_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }
}

impl ClientConfig {
    /// Defaults around a given API root; the upload URL follows it.
    pub fn with_api_base(api_base: &str) -> Self {
        let api_base = normalize_base(api_base);
        Self {
            upload_url: default_upload_url(&api_base),
            api_base,
            author_id: PLACEHOLDER_AUTHOR_ID.to_string(),
            retry: RetryPolicy::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Read `HOSPITAL_BLOG_*` variables, falling back to defaults.
    pub fn from_env() -> Self {
        let api_base = env_string("HOSPITAL_BLOG_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let mut config = Self::with_api_base(&api_base);

        if let Some(upload_url) = env_string("HOSPITAL_BLOG_UPLOAD_URL") {
            config.upload_url = upload_url;
        }
        if let Some(author_id) = env_string("HOSPITAL_BLOG_AUTHOR_ID") {
            config.author_id = author_id;
        }
        if let Some(seconds) = env_u64("HOSPITAL_BLOG_REQUEST_TIMEOUT_SECONDS") {
            config.retry.timeout = Duration::from_secs(seconds.max(1));
        }
        if let Some(attempts) = env_u64("HOSPITAL_BLOG_MAX_ATTEMPTS") {
            config.retry.max_attempts = u32::try_from(attempts).unwrap_or(u32::MAX).max(1);
        }
        if let Some(millis) = env_u64("HOSPITAL_BLOG_BACKOFF_BASE_MS") {
            config.retry.backoff_base = Duration::from_millis(millis);
        }
        if let Some(seconds) = env_u64("HOSPITAL_BLOG_CACHE_TTL_SECONDS") {
            config.cache_ttl = Duration::from_secs(seconds);
        }
        config
    }

    /// Point at another API root; the upload URL follows it.
    pub fn rebase(mut self, api_base: &str) -> Self {
        self.api_base = normalize_base(api_base);
        self.upload_url = default_upload_url(&self.api_base);
        self
    }

    /// `GET/POST {api_base}/posts`
    pub fn posts_url(&self) -> String {
        format!("{}/posts", self.api_base)
    }

    /// `GET/PUT/DELETE {api_base}/posts/{id}`
    pub fn post_url(&self, id: &str) -> String {
        format!("{}/posts/{}", self.api_base, urlencoding::encode(id))
    }
}

fn normalize_base(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

// 上传接口挂在站点根路径下，而不是 /api/v1 下
fn default_upload_url(api_base: &str) -> String {
    let origin = match api_base.find("://") {
        Some(scheme_end) => {
            let rest = &api_base[scheme_end + 3..];
            let host_len = rest.find('/').unwrap_or(rest.len());
            &api_base[..scheme_end + 3 + host_len]
        },
        None => "",
    };
    format!("{origin}/api/upload")
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key).and_then(|value| value.parse::<u64>().ok())
}
