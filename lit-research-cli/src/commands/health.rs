//! Health command

use anyhow::Result;

use crate::context::Context;

/// Probe the service health endpoint
pub async fn execute(ctx: &Context) -> Result<()> {
    let client = ctx.create_client()?;

    let spinner = ctx.output.spinner(&format!("Checking {}...", client.base_url()));
    let result = client.health().check().await;

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    result?;
    ctx.output
        .success(&format!("Service at {} is available", client.base_url()));
    Ok(())
}
