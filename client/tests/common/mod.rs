//! In-memory stand-in for the blog API, plugged in at the transport seam.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use hospital_blog_client::{
    ApiRequest, ApiResponse, ArticleStore, BlogApi, ClientConfig, HttpTransport, ManualClock,
    RequestBody, RequestClient, ResponseCache, TransportError, UnmountHandle,
};
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::{json, Value};

pub const API_BASE: &str = "http://api.test/api/v1";

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Status(u16),
    Network,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct ServerState {
    posts: Vec<Value>,
    next_id: u64,
    faults: VecDeque<(Method, Fault)>,
    latency: Option<Duration>,
    log: Vec<Recorded>,
    unmount_on: Option<(Method, UnmountHandle)>,
}

#[derive(Default)]
pub struct FakeBlogServer {
    state: Mutex<ServerState>,
}

impl FakeBlogServer {
    pub fn with_posts(posts: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ServerState {
                posts,
                next_id: 100,
                ..ServerState::default()
            }),
        })
    }

    /// The next `method` request fails with `fault` instead of being served.
    pub fn fail_next(&self, method: Method, fault: Fault) {
        self.state.lock().faults.push_back((method, fault));
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = Some(latency);
    }

    /// Tear the view down right after the next `method` request is served,
    /// before the client sees the response.
    pub fn unmount_after(&self, method: Method, handle: UnmountHandle) {
        self.state.lock().unmount_on = Some((method, handle));
    }

    /// Change server data behind the client's back.
    pub fn remove_post(&self, id: &str) {
        self.state.lock().posts.retain(|post| post["id"] != id);
    }

    pub fn post(&self, id: &str) -> Option<Value> {
        self.state
            .lock()
            .posts
            .iter()
            .find(|post| post["id"] == id)
            .cloned()
    }

    pub fn requests(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.state
            .lock()
            .log
            .iter()
            .filter(|entry| entry.method == method && entry.path == path)
            .cloned()
            .collect()
    }

    fn serve(&self, method: &Method, path: &str, body: Option<Value>) -> (u16, Value) {
        let mut state = self.state.lock();
        let id = path.strip_prefix("/posts/").map(str::to_string);

        match (method.clone(), id) {
            (Method::GET, None) => (200, json!({ "posts": state.posts })),
            (Method::GET, Some(id)) => match state.posts.iter().find(|post| post["id"] == id.as_str()) {
                Some(post) => (200, post.clone()),
                None => (404, json!({ "error": "not found" })),
            },
            (Method::POST, None) => {
                let id = state.next_id.to_string();
                state.next_id += 1;
                let mut post = body.unwrap_or_else(|| json!({}));
                post["id"] = json!(id);
                state.posts.push(post.clone());
                (201, post)
            },
            (Method::PUT, Some(id)) => {
                let Some(existing) = state.posts.iter_mut().find(|post| post["id"] == id.as_str()) else {
                    return (404, json!({ "error": "not found" }));
                };
                if let (Some(target), Some(Value::Object(fields))) = (existing.as_object_mut(), body) {
                    target.extend(fields);
                }
                (200, existing.clone())
            },
            (Method::DELETE, Some(id)) => {
                let before = state.posts.len();
                state.posts.retain(|post| post["id"] != id.as_str());
                if state.posts.len() == before {
                    (404, json!({ "error": "not found" }))
                } else {
                    (204, Value::Null)
                }
            },
            _ => (405, json!({ "error": "method not allowed" })),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeBlogServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let path = request
            .url
            .strip_prefix(API_BASE)
            .unwrap_or(&request.url)
            .to_string();
        let body = match &request.body {
            RequestBody::Json(bytes) => serde_json::from_slice(bytes).ok(),
            _ => None,
        };

        let fault = {
            let mut state = self.state.lock();
            state.log.push(Recorded {
                method: request.method.clone(),
                path: path.clone(),
                body: body.clone(),
            });
            let position = state
                .faults
                .iter()
                .position(|(method, _)| *method == request.method);
            position.and_then(|index| state.faults.remove(index))
        };

        match fault {
            Some((_, Fault::Network)) => Err(TransportError::Network("connection reset".to_string())),
            Some((_, Fault::Status(status))) => Ok(ApiResponse {
                status,
                body: Bytes::from_static(b"{}"),
            }),
            None => {
                let (status, value) = self.serve(&request.method, &path, body);
                let unmount = {
                    let mut state = self.state.lock();
                    match &state.unmount_on {
                        Some((method, _)) if *method == request.method => state.unmount_on.take(),
                        _ => None,
                    }
                };
                if let Some((_, handle)) = unmount {
                    handle.unmount();
                }
                let body = if value.is_null() {
                    Bytes::new()
                } else {
                    Bytes::from(value.to_string())
                };
                Ok(ApiResponse {
                    status,
                    body,
                })
            },
        }
    }
}

pub fn store_for(server: &Arc<FakeBlogServer>) -> (ArticleStore, ManualClock) {
    let config = ClientConfig::with_api_base(API_BASE);
    let clock = ManualClock::default();
    let cache = ResponseCache::with_clock(config.cache_ttl, Arc::new(clock.clone()));
    let client = RequestClient::new(server.clone(), config.retry);
    (ArticleStore::new(BlogApi::new(client, config), cache), clock)
}

pub fn words(count: usize) -> String {
    std::iter::repeat_n("word", count)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn ids(store: &ArticleStore) -> Vec<String> {
    store
        .articles()
        .iter()
        .map(|view| view.article.id.clone())
        .collect()
}
