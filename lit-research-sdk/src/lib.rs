//! Lit Research SDK
//!
//! This crate provides a resilient Rust client for the literature research
//! API. A topic is submitted as an asynchronous job, polled until the
//! backend finished collecting articles, and then questioned through the
//! generation endpoint.
//!
//! # Features
//!
//! - **Per-call timeouts**: health and status checks, submissions and
//!   generation calls each have their own budget
//! - **Automatic retries**: exponential backoff (2s, 4s, 8s) on transient failures
//! - **Bounded polling**: at most 10 status checks, 5 seconds apart
//! - **Closed error taxonomy**: every failure maps to an [`ErrorKind`]
//! - **UI-friendly results**: [`ChatSession`] returns [`ApiResult`] values and never fails
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lit_research_sdk::{FetchTopicRequest, ResearchClient, SdkConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SdkConfig::new("https://research.example.com").with_api_key("your-api-key");
//!     let client = ResearchClient::new(config)?;
//!
//!     let handle = client
//!         .topics()
//!         .submit(FetchTopicRequest::new("long covid fatigue"))
//!         .await?;
//!     let articles = client.topics().wait_for_articles(&handle).await?;
//!     println!("Found {} articles", articles.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! ```rust,no_run
//! use lit_research_sdk::{ErrorKind, PollOutcome, ResearchClient, JobHandle};
//!
//! async fn wait(client: &ResearchClient, handle: &JobHandle) {
//!     match client.topics().wait(handle).await {
//!         PollOutcome::Completed { .. } => println!("ready"),
//!         PollOutcome::ProcessingFailed { .. } => eprintln!("processing failed"),
//!         PollOutcome::TimedOut { .. } => eprintln!("still pending, resubmit later"),
//!         PollOutcome::QueryFailed { error, .. } => match error.kind() {
//!             ErrorKind::Authentication => eprintln!("check your API key"),
//!             kind => eprintln!("{}", kind),
//!         },
//!     }
//! }
//! ```

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod resources;
pub mod result;
pub mod retry;
pub mod session;

// Re-export main types for convenience
pub use client::{CallClass, HttpClient};
pub use config::{AuthConfig, SdkConfig, SdkConfigBuilder};
pub use error::{ErrorKind, SdkError, SdkResult};
pub use poller::{JobPoller, PollConfig, PollOutcome, StatusSource};
pub use result::ApiResult;
pub use retry::{BackoffSchedule, RetryEvent, RetryPolicy, RetryState};
pub use session::{ChatSession, ServiceHealth};

// Re-export resource clients
pub use resources::health::HealthClient;
pub use resources::queries::{QueriesClient, QueryRequest, QueryResponse};
pub use resources::topics::{
    Article, ArticleSource, FetchTopicRequest, JobHandle, JobStatus, TopicsClient,
    DEFAULT_MAX_RESULTS,
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The main client for the research API.
///
/// Cloning is cheap; clones share the connection pool and the
/// cancellation token.
#[derive(Debug, Clone)]
pub struct ResearchClient {
    http_client: Arc<HttpClient>,
    health: HealthClient,
    topics: TopicsClient,
    queries: QueriesClient,
}

impl ResearchClient {
    /// Create a new client with the given configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use lit_research_sdk::{ResearchClient, SdkConfig};
    ///
    /// let client = ResearchClient::new(SdkConfig::new("https://research.example.com"))?;
    /// # Ok::<(), lit_research_sdk::SdkError>(())
    /// ```
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        Ok(Self::from_http(Arc::new(HttpClient::new(config)?)))
    }

    fn from_http(http_client: Arc<HttpClient>) -> Self {
        Self {
            health: HealthClient::new(Arc::clone(&http_client)),
            topics: TopicsClient::new(Arc::clone(&http_client)),
            queries: QueriesClient::new(Arc::clone(&http_client)),
            http_client,
        }
    }

    /// Create a new client using a builder pattern.
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Liveness probe
    pub fn health(&self) -> &HealthClient {
        &self.health
    }

    /// Topic submission, status and articles
    pub fn topics(&self) -> &TopicsClient {
        &self.topics
    }

    /// Generation calls
    pub fn queries(&self) -> &QueriesClient {
        &self.queries
    }

    /// Get a reference to the underlying HTTP client.
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Get the base URL of the API.
    pub fn base_url(&self) -> &str {
        &self.http_client.config().base_url
    }

    /// Copy of this client whose calls are aborted when `token` is cancelled
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self::from_http(Arc::new(self.http_client.with_cancellation(token)))
    }

    /// Start a chat session on top of this client
    pub fn session(&self) -> ChatSession {
        ChatSession::new(self.clone())
    }
}

/// Builder for creating a ResearchClient with fluent configuration.
#[derive(Debug)]
pub struct ClientBuilder {
    config_builder: SdkConfigBuilder,
}

impl ClientBuilder {
    /// Create a new client builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config_builder: SdkConfig::builder(base_url),
        }
    }

    /// Set the authentication configuration.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.config_builder = self.config_builder.with_auth(auth);
        self
    }

    /// Set the general request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.with_timeout(timeout);
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config_builder = self.config_builder.with_max_retries(max_retries);
        self
    }

    /// Set the backoff unit.
    pub fn with_retry_base_delay(mut self, base: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.with_retry_base_delay(base);
        self
    }

    /// Set the poll budget.
    pub fn with_polling(mut self, max_attempts: u32, interval: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.with_polling(max_attempts, interval);
        self
    }

    /// Enable or disable request/response body logging.
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.config_builder = self.config_builder.with_logging(enable);
        self
    }

    /// Add a custom header to all requests.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.with_header(name, value);
        self
    }

    /// Build the client.
    pub fn build(self) -> SdkResult<ResearchClient> {
        ResearchClient::new(self.config_builder.build())
    }
}
