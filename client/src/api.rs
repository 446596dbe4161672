//! Typed bindings for the blog REST API (`/api/v1/posts`) and the image
//! upload endpoint.

use bytes::Bytes;
use hospital_blog_shared::{Article, PostListResponse, PostPayload, UploadResponse};
use reqwest::Method;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ClientConfig,
    error::RequestError,
    request::RequestClient,
    transport::{ApiRequest, RequestBody},
};

/// Multipart field the upload endpoint reads.
pub const UPLOAD_FIELD: &str = "file";

/// One method per remote endpoint.
#[derive(Clone)]
pub struct BlogApi {
    client: RequestClient,
    config: ClientConfig,
}

impl BlogApi {
    /// Bind `client` to the endpoints in `config`.
    pub fn new(client: RequestClient, config: ClientConfig) -> Self {
        Self {
            client,
            config,
        }
    }

    /// Endpoint configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /posts`
    pub async fn list_posts(&self, cancel: &CancellationToken) -> Result<Vec<Article>, RequestError> {
        let response = self
            .client
            .perform(ApiRequest::get(self.config.posts_url()), cancel)
            .await?;
        Ok(response.json::<PostListResponse>()?.into_posts())
    }

    /// `GET /posts/{id}`
    pub async fn get_post(&self, id: &str, cancel: &CancellationToken) -> Result<Article, RequestError> {
        let response = self
            .client
            .perform(ApiRequest::get(self.config.post_url(id)), cancel)
            .await?;
        response.json()
    }

    /// `POST /posts`
    pub async fn create_post(
        &self,
        payload: &PostPayload,
        cancel: &CancellationToken,
    ) -> Result<(), RequestError> {
        let request = ApiRequest::json(Method::POST, self.config.posts_url(), payload)?;
        self.client.perform(request, cancel).await?;
        Ok(())
    }

    /// `PUT /posts/{id}`
    pub async fn update_post(
        &self,
        id: &str,
        payload: &PostPayload,
        cancel: &CancellationToken,
    ) -> Result<(), RequestError> {
        let request = ApiRequest::json(Method::PUT, self.config.post_url(id), payload)?;
        self.client.perform(request, cancel).await?;
        Ok(())
    }

    /// `DELETE /posts/{id}`
    pub async fn delete_post(&self, id: &str, cancel: &CancellationToken) -> Result<(), RequestError> {
        self.client
            .perform(ApiRequest::delete(self.config.post_url(id)), cancel)
            .await?;
        Ok(())
    }

    /// `POST /api/upload` with multipart field `file`; returns the image URL.
    pub async fn upload_image(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Bytes,
        cancel: &CancellationToken,
    ) -> Result<String, RequestError> {
        let request = ApiRequest {
            method: Method::POST,
            url: self.config.upload_url.clone(),
            body: RequestBody::Multipart {
                field: UPLOAD_FIELD.to_string(),
                file_name: file_name.to_string(),
                mime: mime.to_string(),
                bytes,
            },
        };
        let response = self.client.perform(request, cancel).await?;
        Ok(response.json::<UploadResponse>()?.img_url)
    }
}
