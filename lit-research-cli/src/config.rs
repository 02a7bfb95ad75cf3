//! CLI configuration management

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default API URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Default profile to use
    #[serde(default)]
    pub default_profile: Option<String>,

    /// Named profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

impl CliConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            let config: CliConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`.
    ///
    /// Profiles may hold API keys, so the file is only readable by its owner.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "lit-research", "lit-research-cli")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get a profile by name
    pub fn get_profile(&self, name: Option<&str>) -> Option<&Profile> {
        let profile_name = name.or(self.default_profile.as_deref())?;
        self.profiles.get(profile_name)
    }

    /// Get or create a profile
    pub fn get_or_create_profile(&mut self, name: &str) -> &mut Profile {
        self.profiles.entry(name.to_string()).or_default()
    }

    /// Set the default profile
    pub fn set_default_profile(&mut self, name: &str) {
        self.default_profile = Some(name.to_string());
    }

    /// Remove a profile
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profile names, sorted
    pub fn list_profiles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Apply `key = value` where key is `settings.<field>` or
    /// `profile.<name>.<field>`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["settings", setting] => self.settings.set(setting, value),
            ["profile", name, field] => self.get_or_create_profile(name).set(field, value),
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
    }
}

/// A configuration profile
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    /// API base URL
    #[serde(default)]
    pub api_url: Option<String>,

    /// API key sent with every call except the health probe
    #[serde(default)]
    pub api_key: Option<String>,

    /// Header carrying the API key
    #[serde(default)]
    pub api_key_header: Option<String>,

    /// Additional headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Profile {
    /// Get the API URL, falling back to default
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "api_url" => {
                url::Url::parse(value).with_context(|| format!("Invalid URL: {}", value))?;
                self.api_url = Some(value.to_string());
            }
            "api_key" => self.api_key = Some(value.to_string()),
            "api_key_header" => self.api_key_header = Some(value.to_string()),
            _ => anyhow::bail!("Unknown profile field: {}", field),
        }
        Ok(())
    }
}

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Default output format
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Enable verbose output by default
    #[serde(default)]
    pub verbose: bool,

    /// Timeout in seconds for article fetches
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Status checks before a topic counts as timed out
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    /// Milliseconds between status checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Articles requested per topic
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Settings {
    fn set(&mut self, setting: &str, value: &str) -> Result<()> {
        match setting {
            "output_format" => self.output_format = value.to_string(),
            "color" => self.color = value.parse().context("Invalid boolean value")?,
            "verbose" => self.verbose = value.parse().context("Invalid boolean value")?,
            "timeout_secs" => self.timeout_secs = value.parse().context("Invalid number")?,
            "max_retries" => self.max_retries = value.parse().context("Invalid number")?,
            "poll_attempts" => self.poll_attempts = value.parse().context("Invalid number")?,
            "poll_interval_ms" => {
                self.poll_interval_ms = value.parse().context("Invalid number")?
            }
            "max_results" => self.max_results = value.parse().context("Invalid number")?,
            _ => anyhow::bail!("Unknown setting: {}", setting),
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_format: default_output_format(),
            color: true,
            verbose: false,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            max_results: default_max_results(),
        }
    }
}

fn default_output_format() -> String {
    "table".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_poll_attempts() -> u32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_max_results() -> u32 {
    lit_research_sdk::DEFAULT_MAX_RESULTS
}
