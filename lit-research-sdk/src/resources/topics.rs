//! Topics resource client
//!
//! A topic is a research subject submitted to the backend. Submitting one
//! starts an asynchronous job that collects articles; the job is tracked
//! through a [`JobHandle`].

use crate::client::{CallClass, HttpClient};
use crate::error::{SdkError, SdkResult};
use crate::poller::{JobPoller, PollConfig, PollOutcome, StatusSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default number of articles requested per topic
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Client for topic operations
#[derive(Debug, Clone)]
pub struct TopicsClient {
    client: Arc<HttpClient>,
}

impl TopicsClient {
    /// Create a new topics client
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Submit a topic for processing.
    ///
    /// A blank topic is rejected before any request is made.
    pub async fn submit(&self, request: FetchTopicRequest) -> SdkResult<JobHandle> {
        request.validate()?;
        let response: FetchTopicResponse = self
            .client
            .post("/fetch-topic-data", &request, CallClass::Submission)
            .await?;

        if response.topic_id.trim().is_empty() {
            return Err(SdkError::ApiError {
                status: 200,
                message: "Server returned an empty topic id".to_string(),
                error_code: None,
            });
        }

        Ok(JobHandle::new(response.topic_id))
    }

    /// Get the processing status of a topic. Never retried.
    pub async fn status(&self, handle: &JobHandle) -> SdkResult<JobStatus> {
        let response: TopicStatusResponse = self
            .client
            .get(&format!("/topic/{}/status", handle.topic_id), CallClass::Status)
            .await?;
        Ok(response.status)
    }

    /// Fetch the articles collected for a topic
    pub async fn articles(&self, handle: &JobHandle) -> SdkResult<Vec<Article>> {
        let response: ArticlesResponse = self
            .client
            .get(&format!("/topic/{}/articles", handle.topic_id), CallClass::Fetch)
            .await?;
        Ok(response.articles)
    }

    /// Poll the topic with the client's configured budget
    pub async fn wait(&self, handle: &JobHandle) -> PollOutcome {
        let poller = JobPoller::new(PollConfig::from_config(self.client.config()));
        poller.poll(self, handle).await
    }

    /// Wait for the topic and fetch its articles
    pub async fn wait_for_articles(&self, handle: &JobHandle) -> SdkResult<Vec<Article>> {
        self.wait(handle).await.into_result(handle)?;
        self.articles(handle).await
    }
}

#[async_trait]
impl StatusSource for TopicsClient {
    async fn job_status(&self, handle: &JobHandle) -> SdkResult<JobStatus> {
        self.status(handle).await
    }
}

/// Opaque reference to a submitted topic job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub topic_id: String,
    pub created_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(topic_id: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.topic_id)
    }
}

/// Server-side processing status of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Error,
    /// Any status this client does not know; treated like pending
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Article database to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleSource {
    Pubmed,
    Scopus,
}

/// Request to submit a topic
#[derive(Debug, Clone, Serialize)]
pub struct FetchTopicRequest {
    pub topic: String,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ArticleSource>,
}

impl FetchTopicRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            max_results: DEFAULT_MAX_RESULTS,
            source: None,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_source(mut self, source: ArticleSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Reject requests the backend cannot serve
    pub fn validate(&self) -> SdkResult<()> {
        if self.topic.trim().is_empty() {
            return Err(SdkError::ValidationError(
                "Topic cannot be empty".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(SdkError::ValidationError(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct FetchTopicResponse {
    topic_id: String,
}

#[derive(Debug, Deserialize)]
struct TopicStatusResponse {
    status: JobStatus,
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

/// A research article collected for a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub pubmed_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Article {
    /// Link to the article, derived from the PubMed id when no URL is given
    pub fn link(&self) -> Option<String> {
        self.url.clone().or_else(|| {
            self.pubmed_id
                .as_ref()
                .map(|id| format!("https://pubmed.ncbi.nlm.nih.gov/{}/", id))
        })
    }
}
