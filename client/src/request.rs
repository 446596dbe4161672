//! Resilient request execution: bounded retries, exponential backoff and one
//! overall deadline per logical request.

use std::sync::Arc;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::{
    config::RetryPolicy,
    error::{RequestError, TransportError},
    transport::{ApiRequest, ApiResponse, HttpTransport},
};

/// The only component that talks to the network.
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl RequestClient {
    /// Wrap `transport` with the given retry policy.
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
        }
    }

    /// Active retry policy.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Perform `request` with the policy's attempt budget.
    pub async fn perform(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, RequestError> {
        self.perform_with_attempts(request, self.policy.max_attempts, cancel)
            .await
    }

    /// Perform `request`, retrying server errors and transport failures up
    /// to `max_attempts` times within the policy timeout.
    ///
    /// On timeout or cancellation the in-flight call is dropped, which aborts
    /// it.
    pub async fn perform_with_attempts(
        &self,
        request: ApiRequest,
        max_attempts: u32,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, RequestError> {
        let max_attempts = max_attempts.max(1);
        let attempts = self.run_attempts(&request, max_attempts);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(method = %request.method, url = %request.url, "request cancelled");
                Err(RequestError::Cancelled)
            },
            outcome = timeout(self.policy.timeout, attempts) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        method = %request.method,
                        url = %request.url,
                        timeout_ms = self.policy.timeout.as_millis() as u64,
                        "request timed out"
                    );
                    Err(RequestError::Timeout)
                },
            },
        }
    }

    async fn run_attempts(
        &self,
        request: &ApiRequest,
        max_attempts: u32,
    ) -> Result<ApiResponse, RequestError> {
        let mut last_failure = String::new();

        for attempt in 1..=max_attempts {
            match self.transport.send(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if response.is_server_error() => {
                    last_failure = format!("HTTP error: {}", response.status);
                },
                Ok(response) => {
                    return Err(RequestError::HttpError {
                        status: response.status,
                    });
                },
                Err(TransportError::Cancelled) => return Err(RequestError::Cancelled),
                Err(TransportError::Invalid(message)) => {
                    return Err(RequestError::NetworkFailure(message));
                },
                Err(TransportError::Network(message)) => {
                    last_failure = format!("network error: {message}");
                },
            }

            if attempt < max_attempts {
                let delay = self.policy.backoff(attempt);
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    failure = %last_failure,
                    "retrying request"
                );
                sleep(delay).await;
            }
        }

        Err(RequestError::MaxRetriesExceeded {
            attempts: max_attempts,
            last_failure,
        })
    }
}
