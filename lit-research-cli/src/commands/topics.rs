//! Topic commands

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::Cell;
use lit_research_sdk::{
    Article, ArticleSource, FetchTopicRequest, JobHandle, JobStatus, PollOutcome,
    ResearchClient, SdkError,
};
use serde::Serialize;
use tracing::debug;

use crate::context::Context;
use crate::output::{
    format_timestamp, print_field, print_list_field, print_optional_field, print_section,
    status_badge, truncate, TableDisplay,
};

/// Arguments for commands that submit a topic
#[derive(Debug, Args)]
pub struct TopicArgs {
    /// Research topic, e.g. "gut microbiome and autism"
    pub topic: String,

    /// Number of articles to collect (defaults to `settings.max_results`)
    #[arg(short, long)]
    pub max_results: Option<u32>,

    /// Article database to search
    #[arg(short, long, value_enum)]
    pub source: Option<SourceArg>,
}

/// Arguments for commands that address a submitted topic
#[derive(Debug, Args)]
pub struct TopicIdArgs {
    /// Topic id returned on submission
    pub topic_id: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Pubmed,
    Scopus,
}

impl From<SourceArg> for ArticleSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Pubmed => ArticleSource::Pubmed,
            SourceArg::Scopus => ArticleSource::Scopus,
        }
    }
}

impl TopicArgs {
    pub fn to_request(&self, default_max_results: u32) -> FetchTopicRequest {
        let mut request = FetchTopicRequest::new(self.topic.clone())
            .with_max_results(self.max_results.unwrap_or(default_max_results));
        if let Some(source) = self.source {
            request = request.with_source(source.into());
        }
        request
    }
}

/// Displayable submission
#[derive(Debug, Serialize)]
struct SubmissionDisplay {
    topic_id: String,
    topic: String,
    submitted_at: String,
}

impl TableDisplay for SubmissionDisplay {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.topic_id),
            Cell::new(&self.topic),
            Cell::new(&self.submitted_at),
        ]
    }

    fn display_single(&self) {
        print_section("Submitted topic");
        print_field("Topic ID", &self.topic_id);
        print_field("Topic", &self.topic);
        print_field("Submitted", &self.submitted_at);
    }

    fn display_compact(&self) {
        println!("{}", self.topic_id);
    }
}

/// Displayable processing status
#[derive(Debug, Serialize)]
struct StatusDisplay {
    topic_id: String,
    status: JobStatus,
}

impl TableDisplay for StatusDisplay {
    fn to_row(&self) -> Vec<Cell> {
        vec![Cell::new(&self.topic_id), Cell::new(self.status.to_string())]
    }

    fn display_single(&self) {
        print_section("Topic");
        print_field("Topic ID", &self.topic_id);
        print_field("Status", &status_badge(&self.status.to_string()));
    }

    fn display_compact(&self) {
        println!("{}\t{}", self.topic_id, self.status);
    }
}

/// Displayable article
#[derive(Debug, Serialize)]
pub struct ArticleDisplay {
    title: String,
    authors: Vec<String>,
    #[serde(rename = "abstract")]
    abstract_text: String,
    pubmed_id: Option<String>,
    link: Option<String>,
}

impl From<Article> for ArticleDisplay {
    fn from(a: Article) -> Self {
        Self {
            link: a.link(),
            title: a.title,
            authors: a.authors,
            abstract_text: a.abstract_text,
            pubmed_id: a.pubmed_id,
        }
    }
}

impl ArticleDisplay {
    fn author_summary(&self) -> String {
        match self.authors.as_slice() {
            [] => "-".to_string(),
            [only] => only.clone(),
            [first, ..] => format!("{} et al.", first),
        }
    }
}

impl TableDisplay for ArticleDisplay {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(truncate(&self.title, 60)),
            Cell::new(self.author_summary()),
            Cell::new(self.link.as_deref().unwrap_or("-")),
        ]
    }

    fn display_single(&self) {
        print_section(&self.title);
        print_list_field("Authors", &self.authors);
        print_optional_field("PubMed ID", self.pubmed_id.as_deref());
        print_optional_field("Link", self.link.as_deref());
        if !self.abstract_text.is_empty() {
            print_field("Abstract", &self.abstract_text);
        }
    }

    fn display_compact(&self) {
        println!(
            "{}\t{}\t{}",
            self.title,
            self.author_summary(),
            self.link.as_deref().unwrap_or("-")
        );
    }
}

pub const ARTICLE_HEADERS: &[&str] = &["Title", "Authors", "Link"];

/// Submit a topic, wait for processing and list the collected articles
pub async fn research(ctx: &Context, args: TopicArgs) -> Result<()> {
    let request = args.to_request(ctx.config.settings.max_results);
    request.validate()?;

    let client = ctx.create_client()?;
    client
        .health()
        .check()
        .await
        .map_err(SdkError::service_unavailable)?;

    let handle = submit_topic(ctx, &client, request).await?;
    ctx.output.info(&format!("Topic ID: {}", handle));

    await_completion(ctx, &client, &handle).await?;
    list_articles(ctx, &client, &handle).await
}

/// Submit a topic and print its id
pub async fn submit(ctx: &Context, args: TopicArgs) -> Result<()> {
    let request = args.to_request(ctx.config.settings.max_results);
    request.validate()?;

    let topic = request.topic.clone();
    let client = ctx.create_client()?;
    let handle = submit_topic(ctx, &client, request).await?;

    ctx.output.write(&SubmissionDisplay {
        topic_id: handle.topic_id.clone(),
        topic,
        submitted_at: format_timestamp(&handle.created_at),
    })
}

/// Show the current processing status of a topic
pub async fn status(ctx: &Context, args: TopicIdArgs) -> Result<()> {
    let client = ctx.create_client()?;
    let handle = JobHandle::new(args.topic_id);

    let status = client.topics().status(&handle).await?;
    ctx.output.write(&StatusDisplay {
        topic_id: handle.topic_id,
        status,
    })
}

/// Poll a topic until it finished processing
pub async fn wait(ctx: &Context, args: TopicIdArgs) -> Result<()> {
    let client = ctx.create_client()?;
    let handle = JobHandle::new(args.topic_id);

    await_completion(ctx, &client, &handle).await?;
    ctx.output.write(&StatusDisplay {
        topic_id: handle.topic_id,
        status: JobStatus::Completed,
    })
}

/// List the articles collected for a processed topic
pub async fn articles(ctx: &Context, args: TopicIdArgs) -> Result<()> {
    let client = ctx.create_client()?;
    let handle = JobHandle::new(args.topic_id);
    list_articles(ctx, &client, &handle).await
}

async fn submit_topic(
    ctx: &Context,
    client: &ResearchClient,
    request: FetchTopicRequest,
) -> Result<JobHandle> {
    let spinner = ctx.output.spinner("Submitting topic...");
    let result = client.topics().submit(request).await;

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    let handle = result?;
    ctx.output.success("Topic submitted");
    Ok(handle)
}

async fn await_completion(ctx: &Context, client: &ResearchClient, handle: &JobHandle) -> Result<()> {
    let spinner = ctx
        .output
        .spinner(&format!("Waiting for topic {} to be processed...", handle));
    let outcome = client.topics().wait(handle).await;

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    debug!(topic_id = %handle, attempts = outcome.attempts(), "Polling finished");
    if let PollOutcome::Completed { .. } = outcome {
        ctx.output.success("Topic processed");
    }
    outcome.into_result(handle)?;
    Ok(())
}

async fn list_articles(ctx: &Context, client: &ResearchClient, handle: &JobHandle) -> Result<()> {
    let spinner = ctx.output.spinner("Fetching articles...");
    let result = client.topics().articles(handle).await;

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    let articles: Vec<ArticleDisplay> = result?.into_iter().map(Into::into).collect();
    ctx.output.write_list(&articles, ARTICLE_HEADERS)
}
