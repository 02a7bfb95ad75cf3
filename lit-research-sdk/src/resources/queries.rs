//! Query resource client
//!
//! Sends questions about a processed topic to the generation endpoint.

use crate::client::{CallClass, HttpClient};
use crate::error::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Client for generation calls
#[derive(Debug, Clone)]
pub struct QueriesClient {
    client: Arc<HttpClient>,
}

impl QueriesClient {
    /// Create a new queries client
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Ask a question about a topic
    pub async fn ask(&self, request: QueryRequest) -> SdkResult<QueryResponse> {
        request.validate()?;
        self.client
            .post("/query", &request, CallClass::Generation)
            .await
    }
}

/// Question about a processed topic
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub topic_id: String,
    pub conversation_id: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, topic_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            topic_id: topic_id.into(),
            conversation_id: None,
        }
    }

    /// Continue an existing conversation
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn validate(&self) -> SdkResult<()> {
        if self.query.trim().is_empty() {
            return Err(SdkError::ValidationError("Query cannot be empty".to_string()));
        }
        if self.topic_id.trim().is_empty() {
            return Err(SdkError::ValidationError(
                "A topic must be processed before asking questions".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generated answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub conversation_id: String,
}
