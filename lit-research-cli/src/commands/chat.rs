//! Interactive research chat

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::Input;
use lit_research_sdk::{ApiResult, ChatSession, ErrorKind, ServiceHealth};

use crate::commands::topics::{ArticleDisplay, SourceArg, TopicArgs, ARTICLE_HEADERS};
use crate::context::Context;

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Topic to research before the first question
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Number of articles to collect per topic
    #[arg(short, long)]
    pub max_results: Option<u32>,

    /// Article database to search
    #[arg(short, long, value_enum)]
    pub source: Option<SourceArg>,
}

/// A line typed at the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Topic(String),
    Articles,
    Health,
    Help,
    Quit,
    Question(String),
    Empty,
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatInput::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return ChatInput::Question(line.to_string());
        };

        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map(|(n, r)| (n, r.trim()))
            .unwrap_or((command, ""));
        match name {
            "topic" => ChatInput::Topic(rest.to_string()),
            "articles" => ChatInput::Articles,
            "health" => ChatInput::Health,
            "quit" | "exit" => ChatInput::Quit,
            _ => ChatInput::Help,
        }
    }
}

const HELP: &str = "\
  /topic <text>   research a new topic
  /articles       list the articles of the current topic
  /health         check the service
  /quit           leave the chat
Anything else is asked as a question about the current topic.";

/// Run the interactive chat loop
pub async fn execute(ctx: &Context, args: ChatArgs) -> Result<()> {
    let client = ctx.create_client()?;
    let mut session = client.session();

    let health = session.check_health().await;
    if !health.is_ok() {
        ctx.output
            .error("Service is unavailable. Topics cannot be submitted until it is back.");
    }

    println!("{}", "Literature research chat".bold());
    println!("{}", HELP.dimmed());

    if let Some(topic) = args.topic.clone() {
        research(ctx, &mut session, &args, topic).await;
    }

    while !ctx.cancel.is_cancelled() {
        let prompt = match session.active_job() {
            Some(job) => format!("[{}]", job),
            None => "[no topic]".to_string(),
        };
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;

        match ChatInput::parse(&line) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Help => println!("{}", HELP),
            ChatInput::Health => {
                let result = session.check_health().await;
                if report(ctx, &result) {
                    ctx.output.success("Service is available");
                }
            }
            ChatInput::Articles => {
                let articles: Vec<ArticleDisplay> =
                    session.articles().iter().cloned().map(Into::into).collect();
                ctx.output.write_list(&articles, ARTICLE_HEADERS)?;
            }
            ChatInput::Topic(topic) if topic.is_empty() => {
                ctx.output.error("Usage: /topic <text>");
            }
            ChatInput::Topic(topic) => research(ctx, &mut session, &args, topic).await,
            ChatInput::Question(query) => {
                if session.health() == ServiceHealth::Unavailable {
                    ctx.output.info("The service was unavailable at the last check");
                }
                let spinner = ctx.output.spinner("Generating answer...");
                let result = session.ask(&query).await;
                if let Some(s) = spinner {
                    s.finish_and_clear();
                }
                if report(ctx, &result) {
                    if let Some(answer) = result.data {
                        println!("\n{}\n", answer);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn research(ctx: &Context, session: &mut ChatSession, args: &ChatArgs, topic: String) {
    let request = TopicArgs {
        topic,
        max_results: args.max_results,
        source: args.source,
    }
    .to_request(ctx.config.settings.max_results);

    let spinner = ctx
        .output
        .spinner(&format!("Researching \"{}\"...", request.topic));
    let result = session.research(request).await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    if report(ctx, &result) {
        let count = result.data.map(|a| a.len()).unwrap_or_default();
        ctx.output.success(&format!(
            "Collected {} article(s). Ask away, or type /articles to list them.",
            count
        ));
    }
}

/// Print the error of a failed result; returns whether it succeeded
fn report<T>(ctx: &Context, result: &ApiResult<T>) -> bool {
    let Some(error) = &result.error else {
        return true;
    };
    ctx.output.error(error);
    if result.kind == Some(ErrorKind::JobTimeout) {
        ctx.output
            .info("The topic is still being processed. Submit it again with /topic.");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_chat_input() {
        assert_eq!(ChatInput::parse("   "), ChatInput::Empty);
        assert_eq!(
            ChatInput::parse("What cohorts were studied?"),
            ChatInput::Question("What cohorts were studied?".to_string())
        );
        assert_eq!(
            ChatInput::parse("/topic  long covid fatigue "),
            ChatInput::Topic("long covid fatigue".to_string())
        );
        assert_eq!(ChatInput::parse("/topic"), ChatInput::Topic(String::new()));
        assert_eq!(ChatInput::parse("/articles"), ChatInput::Articles);
        assert_eq!(ChatInput::parse("/exit"), ChatInput::Quit);
        assert_eq!(ChatInput::parse("/what"), ChatInput::Help);
    }
}
