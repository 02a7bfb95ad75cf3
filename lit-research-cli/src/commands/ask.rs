//! Ask command

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comfy_table::Cell;
use lit_research_sdk::{QueryRequest, QueryResponse};
use serde::Serialize;

use crate::context::Context;
use crate::output::{print_field, TableDisplay};

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Question about the topic's articles
    pub query: String,

    /// Topic the question refers to
    #[arg(short, long)]
    pub topic_id: String,

    /// Continue an earlier conversation
    #[arg(short, long)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnswerDisplay {
    response: String,
    conversation_id: String,
}

impl From<QueryResponse> for AnswerDisplay {
    fn from(r: QueryResponse) -> Self {
        Self {
            response: r.response,
            conversation_id: r.conversation_id,
        }
    }
}

impl TableDisplay for AnswerDisplay {
    fn to_row(&self) -> Vec<Cell> {
        vec![Cell::new(&self.conversation_id), Cell::new(&self.response)]
    }

    fn display_single(&self) {
        println!("{}\n", self.response);
        print_field("Conversation", &self.conversation_id.dimmed().to_string());
    }

    fn display_compact(&self) {
        println!("{}", self.response);
    }
}

/// Ask one question about a processed topic
pub async fn execute(ctx: &Context, args: AskArgs) -> Result<()> {
    let mut request = QueryRequest::new(args.query, args.topic_id);
    if let Some(conversation_id) = args.conversation_id {
        request = request.with_conversation(conversation_id);
    }
    request.validate()?;

    let client = ctx.create_client()?;

    let spinner = ctx.output.spinner("Generating answer...");
    let result = client.queries().ask(request).await;

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    let answer: AnswerDisplay = result?.into();
    ctx.output.write(&answer)
}
