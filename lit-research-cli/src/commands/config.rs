//! Configuration commands

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::{CliConfig, Profile};
use crate::context::Context;

/// Configuration management commands
#[derive(Debug, Args)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration
    Show {
        /// Only show this profile
        name: Option<String>,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., settings.poll_attempts, profile.prod.api_key)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to use as default
        name: String,
    },

    /// Create a new profile
    CreateProfile {
        /// Profile name
        name: String,

        /// API URL for this profile
        #[arg(long)]
        url: Option<String>,

        /// API key for this profile
        #[arg(long)]
        key: Option<String>,

        /// Copy settings from another profile
        #[arg(long)]
        from: Option<String>,
    },

    /// Delete a profile
    DeleteProfile {
        /// Profile name to delete
        name: String,

        /// Force deletion without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset {
        /// Force reset without confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Execute configuration commands
pub async fn execute(ctx: &Context, cmd: ConfigCommands) -> Result<()> {
    match cmd.command {
        ConfigSubcommand::Show { name } => show(ctx, name.as_deref()),
        ConfigSubcommand::Set { key, value } => set(ctx, &key, &value),
        ConfigSubcommand::Profiles => list_profiles(ctx),
        ConfigSubcommand::Use { name } => use_profile(ctx, &name),
        ConfigSubcommand::CreateProfile {
            name,
            url,
            key,
            from,
        } => create_profile(ctx, &name, url, key, from.as_deref()),
        ConfigSubcommand::DeleteProfile { name, force } => delete_profile(ctx, &name, force),
        ConfigSubcommand::Path => show_path(),
        ConfigSubcommand::Reset { force } => reset(ctx, force),
    }
}

/// Mask all but the last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

fn print_profile(name: &str, profile: &Profile, is_default: bool) {
    let default_marker = if is_default {
        " (default)".green().to_string()
    } else {
        String::new()
    };
    println!("  [{}]{}", name, default_marker);
    println!("    api_url: {}", profile.api_url());
    println!(
        "    api_key: {}",
        profile
            .api_key
            .as_deref()
            .map(mask_secret)
            .unwrap_or_else(|| "not set".to_string())
    );
    if let Some(header) = &profile.api_key_header {
        println!("    api_key_header: {}", header);
    }
    if !profile.headers.is_empty() {
        println!("    headers:");
        for (k, v) in &profile.headers {
            println!("      {}: {}", k, v);
        }
    }
}

fn show(ctx: &Context, profile: Option<&str>) -> Result<()> {
    println!("{}", "Configuration".bold().underline());
    println!();

    let settings = &ctx.config.settings;
    println!("{}", "Settings:".cyan());
    println!("  output_format: {}", settings.output_format);
    println!("  color: {}", settings.color);
    println!("  verbose: {}", settings.verbose);
    println!("  timeout_secs: {}", settings.timeout_secs);
    println!("  max_retries: {}", settings.max_retries);
    println!("  poll_attempts: {}", settings.poll_attempts);
    println!("  poll_interval_ms: {}", settings.poll_interval_ms);
    println!("  max_results: {}", settings.max_results);

    if let Some(default) = &ctx.config.default_profile {
        println!();
        println!("{}: {}", "Default profile".cyan(), default);
    }

    println!();
    println!("{}", "Profiles:".cyan());

    let default = ctx.config.default_profile.as_deref();
    if let Some(name) = profile {
        match ctx.config.profiles.get(name) {
            Some(p) => print_profile(name, p, default == Some(name)),
            None => println!("  Profile '{}' not found", name),
        }
    } else if ctx.config.profiles.is_empty() {
        println!("  No profiles configured");
    } else {
        for name in ctx.config.list_profiles() {
            if let Some(p) = ctx.config.profiles.get(name) {
                print_profile(name, p, default == Some(name));
            }
        }
    }

    Ok(())
}

fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = ctx.config.clone();
    config.set_value(key, value)?;
    config.save().context("Failed to save configuration")?;

    let shown = if key.ends_with("api_key") {
        mask_secret(value)
    } else {
        value.to_string()
    };
    ctx.output.success(&format!("Set {} = {}", key, shown));
    Ok(())
}

fn list_profiles(ctx: &Context) -> Result<()> {
    if ctx.config.profiles.is_empty() {
        ctx.output.info(
            "No profiles configured. Run 'lit-research config create-profile <name>' to create one.",
        );
        return Ok(());
    }

    println!("{}", "Configured profiles:".bold());
    println!();

    for name in ctx.config.list_profiles() {
        let is_default = ctx.config.default_profile.as_deref() == Some(name);
        if is_default {
            println!("  {} {}", "→".green(), name.green().bold());
        } else {
            println!("    {}", name);
        }
    }

    Ok(())
}

fn use_profile(ctx: &Context, name: &str) -> Result<()> {
    let mut config = ctx.config.clone();

    if !config.profiles.contains_key(name) {
        anyhow::bail!(
            "Profile '{}' not found. Run 'lit-research config profiles' to list available profiles.",
            name
        );
    }

    config.set_default_profile(name);
    config.save().context("Failed to save configuration")?;

    ctx.output.success(&format!("Now using profile '{}'", name));
    Ok(())
}

fn create_profile(
    ctx: &Context,
    name: &str,
    api_url: Option<String>,
    api_key: Option<String>,
    from: Option<&str>,
) -> Result<()> {
    let mut config = ctx.config.clone();

    if config.profiles.contains_key(name) {
        anyhow::bail!("Profile '{}' already exists", name);
    }

    let new_profile = match from {
        Some(source) => config
            .get_profile(Some(source))
            .cloned()
            .with_context(|| format!("Source profile '{}' not found", source))?,
        None => Profile::default(),
    };
    config.profiles.insert(name.to_string(), new_profile);

    if let Some(url) = api_url {
        config.set_value(&format!("profile.{}.api_url", name), &url)?;
    }
    if let Some(key) = api_key {
        config.set_value(&format!("profile.{}.api_key", name), &key)?;
    }
    if config.default_profile.is_none() {
        config.set_default_profile(name);
    }

    config.save().context("Failed to save configuration")?;
    ctx.output.success(&format!("Created profile '{}'", name));

    if let Some(source) = from {
        ctx.output.info(&format!("Copied settings from '{}'", source));
    }

    Ok(())
}

fn delete_profile(ctx: &Context, name: &str, force: bool) -> Result<()> {
    let mut config = ctx.config.clone();

    if !config.profiles.contains_key(name) {
        anyhow::bail!("Profile '{}' not found", name);
    }

    if !force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Delete profile '{}'?", name))
            .default(false)
            .interact()
            .context("Failed to get confirmation")?;

        if !confirm {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }

    config.remove_profile(name);
    config.save().context("Failed to save configuration")?;

    ctx.output.success(&format!("Deleted profile '{}'", name));
    Ok(())
}

fn show_path() -> Result<()> {
    let path = CliConfig::config_path()?;
    let status = if path.exists() { "✓".green() } else { "✗".red() };
    println!("{} {}", status, path.display());
    Ok(())
}

fn reset(ctx: &Context, force: bool) -> Result<()> {
    if !force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt("Reset all configuration to defaults? This cannot be undone.")
            .default(false)
            .interact()
            .context("Failed to get confirmation")?;

        if !confirm {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }

    CliConfig::default()
        .save()
        .context("Failed to save configuration")?;

    ctx.output.success("Configuration reset to defaults");
    Ok(())
}
