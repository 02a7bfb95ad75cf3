//! Lit Research CLI
//!
//! Command-line research assistant: submit a topic, wait for the backend to
//! collect articles, then ask questions about them.

mod cli;
mod commands;
mod config;
mod context;
mod output;

use clap::Parser;
use lit_research_sdk::SdkError;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::context::Context;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = match Context::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling pending requests");
            cancel.cancel();
        }
    });

    match run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<SdkError>() {
                Some(sdk_error) => ctx.output.api_error(sdk_error),
                None => ctx.output.error(&format!("{:#}", e)),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Health => commands::health::execute(ctx).await,
        Commands::Research(args) => commands::topics::research(ctx, args).await,
        Commands::Submit(args) => commands::topics::submit(ctx, args).await,
        Commands::Status(args) => commands::topics::status(ctx, args).await,
        Commands::Wait(args) => commands::topics::wait(ctx, args).await,
        Commands::Articles(args) => commands::topics::articles(ctx, args).await,
        Commands::Ask(args) => commands::ask::execute(ctx, args).await,
        Commands::Chat(args) => commands::chat::execute(ctx, args).await,
        Commands::Config(cmd) => commands::config::execute(ctx, cmd).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "lit_research=debug,lit_research_sdk=debug"
    } else {
        "lit_research=warn,lit_research_sdk=warn"
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
