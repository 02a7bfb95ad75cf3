//! HTTP client implementation
//!
//! This module provides the request pipeline of the SDK: JSON headers,
//! API key attachment, per-call timeouts, request/response logging and the
//! retry interceptor.

use crate::config::{AuthConfig, SdkConfig};
use crate::error::{SdkError, SdkResult};
use crate::retry::RetryPolicy;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Category of an outbound call.
///
/// The class fixes the call's timeout, whether it carries the API key and
/// whether the retry interceptor applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallClass {
    /// Liveness probe
    Health,
    /// Job submission
    Submission,
    /// Job status check issued by the poller
    Status,
    /// Result payload fetch
    Fetch,
    /// AI generation call
    Generation,
}

impl CallClass {
    /// Per-call timeout for this class
    pub fn timeout(&self, config: &SdkConfig) -> Duration {
        match self {
            CallClass::Health => config.health_timeout,
            CallClass::Status => config.status_timeout,
            CallClass::Submission => config.submit_timeout,
            CallClass::Generation => config.generation_timeout,
            CallClass::Fetch => config.timeout,
        }
    }

    /// Whether the call must carry credentials
    pub fn requires_auth(&self) -> bool {
        !matches!(self, CallClass::Health)
    }

    /// Whether failures go through the retry interceptor.
    ///
    /// Status checks already run inside the poller's bounded loop.
    pub fn is_retried(&self) -> bool {
        !matches!(self, CallClass::Status)
    }
}

/// The HTTP client for making API requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<SdkConfig>,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        for (name, value) in &config.custom_headers {
            let name = header::HeaderName::try_from(name.as_str()).map_err(|e| {
                SdkError::ConfigurationError(format!("Invalid header name {}: {}", name, e))
            })?;
            let value = header::HeaderValue::try_from(value.as_str()).map_err(|e| {
                SdkError::ConfigurationError(format!("Invalid value for header {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(SdkError::NetworkError)?;

        Ok(Self {
            client,
            retry: RetryPolicy::from_config(&config),
            config: Arc::new(config),
            cancel: CancellationToken::new(),
        })
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Retry policy applied to retried call classes
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Token that cancels every call made through this client
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Clone of this client whose calls are bound to `token`
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self.clone()
        }
    }

    /// Build the full URL for an endpoint
    pub fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// GET a JSON payload
    pub async fn get<T: DeserializeOwned>(&self, path: &str, class: CallClass) -> SdkResult<T> {
        let text = self.execute(Method::GET, path, None, class).await?;
        serde_json::from_str(&text).map_err(SdkError::SerializationError)
    }

    /// POST a JSON body and decode the JSON answer
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        class: CallClass,
    ) -> SdkResult<T> {
        let body = serde_json::to_string(body)?;
        let text = self.execute(Method::POST, path, Some(body), class).await?;
        serde_json::from_str(&text).map_err(SdkError::SerializationError)
    }

    /// GET an endpoint and only check for a success status
    pub async fn probe(&self, path: &str, class: CallClass) -> SdkResult<()> {
        self.execute(Method::GET, path, None, class).await.map(|_| ())
    }

    /// Run one logical request, with retries when the class allows them
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        class: CallClass,
    ) -> SdkResult<String> {
        let url = self.url(path);
        let method = &method;
        let url = url.as_str();
        let body = body.as_deref();

        if class.is_retried() {
            self.retry
                .execute(&self.cancel, move |attempt| {
                    self.send_once(method, url, body, class, attempt)
                })
                .await
        } else {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(SdkError::Cancelled),
                result = self.send_once(method, url, body, class, 0) => result,
            }
        }
    }

    /// Issue a single HTTP exchange and classify its outcome
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        body: Option<&str>,
        class: CallClass,
        attempt: u32,
    ) -> SdkResult<String> {
        let timeout = class.timeout(&self.config);
        let mut request = self.client.request(method.clone(), url).timeout(timeout);

        if class.requires_auth() {
            request = self.add_auth(request);
        }

        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        debug!(method = %method, url, attempt, class = ?class, "Sending request");
        if self.config.enable_logging {
            if let Some(body) = body {
                debug!(body, "Request body");
            }
        }

        let response = request.send().await.map_err(|e| {
            error!(method = %method, url, error = %e, "Request failed");
            SdkError::from_transport(e, timeout)
        })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let text = response
            .text()
            .await
            .map_err(|e| SdkError::from_transport(e, timeout))?;

        debug!(method = %method, url, status = status.as_u16(), "Response received");
        if self.config.enable_logging {
            debug!(body = %text, "Response body");
        }

        if status.is_success() {
            Ok(text)
        } else {
            Err(SdkError::from_response(status.as_u16(), &text, retry_after))
        }
    }

    /// Add authentication to a request
    fn add_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            AuthConfig::None => request,
            AuthConfig::ApiKey(key) => request.header(self.config.api_key_header.as_str(), key.as_str()),
            AuthConfig::BearerToken(token) => {
                request.header(header::AUTHORIZATION, format!("Bearer {}", token))
            }
        }
    }
}
