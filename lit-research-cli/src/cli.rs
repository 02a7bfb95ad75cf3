//! Command-line definition

use clap::{Parser, Subcommand};

use crate::commands::{
    ask::AskArgs, chat::ChatArgs, config::ConfigCommands, topics::TopicArgs, topics::TopicIdArgs,
};
use crate::output::OutputFormat;

/// Literature research assistant
#[derive(Debug, Parser)]
#[command(name = "lit-research", version, about, long_about = None)]
pub struct Cli {
    /// Configuration profile to use
    #[arg(short, long, global = true, env = "LIT_RESEARCH_PROFILE")]
    pub profile: Option<String>,

    /// API base URL (overrides the profile)
    #[arg(long, global = true, env = "LIT_RESEARCH_API_URL")]
    pub api_url: Option<String>,

    /// API key (overrides the profile)
    #[arg(long, global = true, env = "LIT_RESEARCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format (defaults to `settings.output_format`)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Log requests and responses
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check whether the research service is reachable
    Health,

    /// Submit a topic, wait for processing and list its articles
    Research(TopicArgs),

    /// Submit a topic without waiting
    Submit(TopicArgs),

    /// Show the processing status of a topic
    Status(TopicIdArgs),

    /// Wait until a topic finished processing
    Wait(TopicIdArgs),

    /// List the articles collected for a topic
    Articles(TopicIdArgs),

    /// Ask a question about a processed topic
    Ask(AskArgs),

    /// Interactive research chat
    Chat(ChatArgs),

    /// Manage configuration
    Config(ConfigCommands),
}
