//! The network seam. `RequestClient` only ever talks to an [`HttpTransport`].

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA},
    multipart::{Form, Part},
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{RequestError, TransportError};

/// Request body. Kept as owned bytes so a retry can resend it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// Serialized JSON document.
    Json(Bytes),
    /// Single-file multipart form.
    Multipart {
        /// Form field name.
        field: String,
        /// Uploaded file name.
        file_name: String,
        /// MIME type of `bytes`.
        mime: String,
        /// File content.
        bytes: Bytes,
    },
}

/// One HTTP call, independent of the client library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Verb.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Payload.
    pub body: RequestBody,
}

impl ApiRequest {
    /// `GET url`
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: RequestBody::Empty,
        }
    }

    /// `DELETE url`
    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            url: url.into(),
            body: RequestBody::Empty,
        }
    }

    /// `method url` with a JSON body.
    pub fn json<T: Serialize>(
        method: Method,
        url: impl Into<String>,
        payload: &T,
    ) -> Result<Self, RequestError> {
        let encoded = serde_json::to_vec(payload)
            .map_err(|err| RequestError::Encode(err.to_string()))?;
        Ok(Self {
            method,
            url: url.into(),
            body: RequestBody::Json(Bytes::from(encoded)),
        })
    }
}

/// Status and body of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body.
    pub body: Bytes,
}

impl ApiResponse {
    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 5xx; the only statuses worth retrying.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        serde_json::from_slice(&self.body).map_err(|err| RequestError::Decode(err.to_string()))
    }
}

/// Performs a single HTTP exchange. No retries, no timeouts.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and wait for the full response.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build with a default `reqwest` client.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hospital-blog-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| TransportError::Invalid(format!("failed to build http client: {err}")))?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client (proxies, custom TLS).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let builder = self
            .client
            .request(request.method, &request.url)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache, no-store, max-age=0")
            .header(PRAGMA, "no-cache");

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.header(CONTENT_TYPE, "application/json").body(bytes),
            RequestBody::Multipart {
                field,
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|err| TransportError::Invalid(err.to_string()))?;
                builder.multipart(Form::new().part(field, part))
            },
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;
        Ok(ApiResponse {
            status,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Invalid(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}
