//! Chat session
//!
//! Front-end facade over [`ResearchClient`]. It keeps the state a chat page
//! needs (service health, the active topic job, collected articles and the
//! conversation id) and turns every outcome into an [`ApiResult`].

use crate::error::{SdkError, SdkResult};
use crate::resources::queries::QueryRequest;
use crate::resources::topics::{Article, FetchTopicRequest, JobHandle};
use crate::result::ApiResult;
use crate::ResearchClient;
use tracing::{info, warn};

/// Health of the backend as last observed by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceHealth {
    Unknown,
    Healthy,
    Unavailable,
}

/// Stateful chat flow over the research API
#[derive(Debug, Clone)]
pub struct ChatSession {
    client: ResearchClient,
    health: ServiceHealth,
    active_job: Option<JobHandle>,
    articles: Vec<Article>,
    conversation_id: Option<String>,
}

impl ChatSession {
    pub fn new(client: ResearchClient) -> Self {
        Self {
            client,
            health: ServiceHealth::Unknown,
            active_job: None,
            articles: Vec::new(),
            conversation_id: None,
        }
    }

    pub fn health(&self) -> ServiceHealth {
        self.health
    }

    /// Job of the last topic that finished processing
    pub fn active_job(&self) -> Option<&JobHandle> {
        self.active_job.as_ref()
    }

    /// Articles of the active topic, once processing completed
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Probe the backend and remember the answer
    pub async fn check_health(&mut self) -> ApiResult<()> {
        let result = self.client.health().check().await;
        self.health = if result.is_ok() {
            ServiceHealth::Healthy
        } else {
            ServiceHealth::Unavailable
        };
        result.into()
    }

    /// Submit a topic, wait for processing and collect its articles.
    ///
    /// The topic is validated first, then submission is refused while the
    /// backend is known to be down. A new topic replaces the previous job
    /// and starts a fresh conversation; it only becomes the active job once
    /// processing completed.
    pub async fn research(&mut self, request: FetchTopicRequest) -> ApiResult<Vec<Article>> {
        self.try_research(request).await.into()
    }

    async fn try_research(&mut self, request: FetchTopicRequest) -> SdkResult<Vec<Article>> {
        request.validate()?;
        self.ensure_available().await?;

        let handle = self.client.topics().submit(request).await?;
        info!(topic_id = %handle.topic_id, "Topic submitted");

        self.active_job = None;
        self.articles.clear();
        self.conversation_id = None;

        let articles = self.client.topics().wait_for_articles(&handle).await?;
        self.active_job = Some(handle);
        self.articles = articles.clone();
        Ok(articles)
    }

    /// Ask a question about the active topic
    pub async fn ask(&mut self, query: &str) -> ApiResult<String> {
        self.try_ask(query).await.into()
    }

    async fn try_ask(&mut self, query: &str) -> SdkResult<String> {
        let handle = self.active_job.as_ref().ok_or_else(|| {
            SdkError::ValidationError("Research a topic before asking questions".to_string())
        })?;

        let mut request = QueryRequest::new(query, handle.topic_id.clone());
        if let Some(conversation_id) = &self.conversation_id {
            request = request.with_conversation(conversation_id.clone());
        }

        let response = self.client.queries().ask(request).await?;
        self.conversation_id = Some(response.conversation_id);
        Ok(response.response)
    }

    async fn ensure_available(&mut self) -> SdkResult<()> {
        if self.health != ServiceHealth::Healthy {
            if let Err(e) = self.client.health().check().await {
                warn!(error = %e, "Refusing submission, service is unavailable");
                self.health = ServiceHealth::Unavailable;
                return Err(SdkError::service_unavailable(e));
            }
            self.health = ServiceHealth::Healthy;
        }
        Ok(())
    }
}
