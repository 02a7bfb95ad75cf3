//! Liveness probe

use crate::client::{CallClass, HttpClient};
use crate::error::SdkResult;
use std::sync::Arc;

/// Client for the health endpoint
#[derive(Debug, Clone)]
pub struct HealthClient {
    client: Arc<HttpClient>,
}

impl HealthClient {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Probe `/health`; any success status means the service is up
    pub async fn check(&self) -> SdkResult<()> {
        self.client.probe("/health", CallClass::Health).await
    }

    /// Probe `/health` and collapse the outcome to a flag
    pub async fn is_healthy(&self) -> bool {
        match self.check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "API health check failed");
                false
            }
        }
    }
}
