//! SDK configuration
//!
//! This module provides configuration options for the SDK client.

use crate::error::{SdkError, SdkResult};
use std::time::Duration;

/// Header carrying the API key unless overridden
pub const DEFAULT_API_KEY_HEADER: &str = "apikey";

/// Configuration for the SDK client
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Base URL for the API
    pub base_url: String,

    /// Authentication method
    pub auth: AuthConfig,

    /// Header name used for [`AuthConfig::ApiKey`]
    pub api_key_header: String,

    /// Timeout for calls without a dedicated budget (article fetches)
    pub timeout: Duration,

    /// Timeout for the liveness probe
    pub health_timeout: Duration,

    /// Timeout for job status checks
    pub status_timeout: Duration,

    /// Timeout for job submission
    pub submit_timeout: Duration,

    /// Timeout for generation calls
    pub generation_timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum number of retries after the first attempt
    pub max_retries: u32,

    /// Unit of the exponential backoff; retry `n` waits `base * 2^n`
    pub retry_base_delay: Duration,

    /// Maximum number of status checks per poll loop
    pub poll_max_attempts: u32,

    /// Delay between status checks
    pub poll_interval: Duration,

    /// User agent string
    pub user_agent: String,

    /// Enable request/response body logging
    pub enable_logging: bool,

    /// Custom headers to add to all requests
    pub custom_headers: Vec<(String, String)>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            auth: AuthConfig::None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout: Duration::from_secs(30),
            health_timeout: Duration::from_secs(5),
            status_timeout: Duration::from_secs(5),
            submit_timeout: Duration::from_secs(10),
            generation_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            poll_max_attempts: 10,
            poll_interval: Duration::from_millis(5000),
            user_agent: format!("lit-research-sdk/{}", env!("CARGO_PKG_VERSION")),
            enable_logging: false,
            custom_headers: Vec::new(),
        }
    }
}

impl SdkConfig {
    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a new builder with the given base URL
    pub fn builder(base_url: impl Into<String>) -> SdkConfigBuilder {
        SdkConfigBuilder {
            config: Self::new(base_url),
        }
    }

    /// Set the authentication method
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Set the API key for authentication
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.auth = AuthConfig::ApiKey(api_key.into());
        self
    }

    /// Set the header name carrying the API key
    pub fn with_api_key_header(mut self, name: impl Into<String>) -> Self {
        self.api_key_header = name.into();
        self
    }

    /// Set the general request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff unit
    pub fn with_retry_base_delay(mut self, base: Duration) -> Self {
        self.retry_base_delay = base;
        self
    }

    /// Set the poll budget and interval
    pub fn with_polling(mut self, max_attempts: u32, interval: Duration) -> Self {
        self.poll_max_attempts = max_attempts;
        self.poll_interval = interval;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable request/response body logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Add a custom header to all requests
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> SdkResult<()> {
        if self.base_url.is_empty() {
            return Err(SdkError::ConfigurationError(
                "Base URL cannot be empty".to_string(),
            ));
        }

        url::Url::parse(&self.base_url)?;

        let timeouts = [
            ("timeout", self.timeout),
            ("health_timeout", self.health_timeout),
            ("status_timeout", self.status_timeout),
            ("submit_timeout", self.submit_timeout),
            ("generation_timeout", self.generation_timeout),
        ];
        for (name, value) in timeouts {
            if value.is_zero() {
                return Err(SdkError::ConfigurationError(format!(
                    "{} cannot be zero",
                    name
                )));
            }
        }

        if self.poll_max_attempts == 0 {
            return Err(SdkError::ConfigurationError(
                "poll_max_attempts must be at least 1".to_string(),
            ));
        }

        if self.api_key_header.trim().is_empty() {
            return Err(SdkError::ConfigurationError(
                "API key header name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// No authentication
    None,

    /// API key sent in the configured API key header
    ApiKey(String),

    /// Bearer token (JWT) authentication
    BearerToken(String),
}

impl AuthConfig {
    /// Check if authentication is configured
    pub fn is_configured(&self) -> bool {
        !matches!(self, AuthConfig::None)
    }
}

/// Builder for SDK configuration
#[derive(Debug, Default)]
pub struct SdkConfigBuilder {
    config: SdkConfig,
}

impl SdkConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.auth = AuthConfig::ApiKey(key.into());
        self
    }

    /// Set the authentication method
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    /// Set the general timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set max retries
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the backoff unit
    pub fn with_retry_base_delay(mut self, base: Duration) -> Self {
        self.config.retry_base_delay = base;
        self
    }

    /// Set the poll budget and interval
    pub fn with_polling(mut self, max_attempts: u32, interval: Duration) -> Self {
        self.config.poll_max_attempts = max_attempts;
        self.config.poll_interval = interval;
        self
    }

    /// Enable/disable body logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.config.enable_logging = enable;
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Build the configuration
    pub fn build(self) -> SdkConfig {
        self.config
    }
}
