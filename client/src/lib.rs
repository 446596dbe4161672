//! Data-access layer for the hospital blog front end.
//!
//! [`RequestClient`] is the only component that talks to the network,
//! [`ResponseCache`] avoids redundant fetches, and [`ArticleStore`] owns the
//! article list a view renders and keeps it consistent with the server.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod request;
pub mod store;
pub mod transport;

pub use api::BlogApi;
pub use cache::{CacheKey, CachedPayload, Clock, ManualClock, ResponseCache, SystemClock};
pub use config::{ClientConfig, RetryPolicy};
pub use error::{RequestError, TransportError};
pub use filter::{ArticleFilter, CategoryFilter, StatusFilter};
pub use request::RequestClient;
pub use store::{ArticleStore, LoadState, UnmountHandle, ViewMode};
pub use tokio_util::sync::CancellationToken;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, RequestBody, ReqwestTransport};
