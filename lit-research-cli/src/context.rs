//! CLI execution context

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use lit_research_sdk::{AuthConfig, ResearchClient, SdkConfig};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::config::{CliConfig, Profile};
use crate::output::{OutputFormat, OutputWriter};

/// Execution context for CLI commands
pub struct Context {
    /// CLI configuration
    pub config: CliConfig,

    /// Active profile name
    pub profile_name: Option<String>,

    /// Active profile
    pub profile: Profile,

    /// Output writer
    pub output: OutputWriter,

    /// Verbose mode
    pub verbose: bool,

    /// API URL override
    pub api_url_override: Option<String>,

    /// API key override
    pub api_key_override: Option<String>,

    /// Cancelled on Ctrl-C; aborts in-flight requests and backoff waits
    pub cancel: CancellationToken,
}

impl Context {
    /// Create a new context from CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = CliConfig::load()?;
        Ok(Self::with_config(cli, config))
    }

    /// Create a context from CLI arguments and an already loaded config
    pub fn with_config(cli: &Cli, config: CliConfig) -> Self {
        let profile_name = cli.profile.clone().or_else(|| config.default_profile.clone());
        let profile = config
            .get_profile(profile_name.as_deref())
            .cloned()
            .unwrap_or_default();

        let format = cli
            .output
            .or_else(|| OutputFormat::from_str(&config.settings.output_format, true).ok())
            .unwrap_or_default();
        let no_color = cli.no_color || !config.settings.color;
        let output = OutputWriter::new(format, no_color);

        Self {
            verbose: cli.verbose || config.settings.verbose,
            config,
            profile_name,
            profile,
            output,
            api_url_override: cli.api_url.clone(),
            api_key_override: cli.api_key.clone(),
            cancel: CancellationToken::new(),
        }
    }

    /// Get the effective API URL
    pub fn api_url(&self) -> &str {
        self.api_url_override
            .as_deref()
            .unwrap_or_else(|| self.profile.api_url())
    }

    /// Get the SDK authentication configuration
    pub fn auth_config(&self) -> AuthConfig {
        self.api_key_override
            .as_ref()
            .or(self.profile.api_key.as_ref())
            .map(|key| AuthConfig::ApiKey(key.clone()))
            .unwrap_or(AuthConfig::None)
    }

    /// Build the SDK configuration for this invocation
    pub fn sdk_config(&self) -> SdkConfig {
        let settings = &self.config.settings;

        let mut config = SdkConfig::new(self.api_url())
            .with_auth(self.auth_config())
            .with_timeout(Duration::from_secs(settings.timeout_secs))
            .with_max_retries(settings.max_retries)
            .with_polling(
                settings.poll_attempts,
                Duration::from_millis(settings.poll_interval_ms),
            )
            .with_user_agent(format!("lit-research-cli/{}", env!("CARGO_PKG_VERSION")))
            .with_logging(self.verbose);

        if let Some(header) = &self.profile.api_key_header {
            config = config.with_api_key_header(header.clone());
        }

        for (name, value) in &self.profile.headers {
            config = config.with_header(name.clone(), value.clone());
        }

        config
    }

    /// Create an SDK client
    pub fn create_client(&self) -> Result<ResearchClient> {
        let client =
            ResearchClient::new(self.sdk_config()).context("Failed to create API client")?;
        Ok(client.with_cancellation(self.cancel.clone()))
    }
}
