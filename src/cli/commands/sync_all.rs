//! Replicate every branch and tag of a remote to a new URL

use anyhow::{Result, bail};
use clap::Args;

use super::CommandContext;
use crate::sync::{ReplicateOptions, ReplicationStatus, Replicator};

#[derive(Args, Debug, Default)]
pub struct SyncAllArgs {
    /// Destination repository URL
    pub destination: String,

    /// Remote to copy from (defaults to replicate.source, "origin")
    #[arg(short, long)]
    pub source: Option<String>,

    /// Force push (overwrites destination history)
    #[arg(short, long)]
    pub force: bool,

    /// Force push only if the destination refs are the ones last seen
    #[arg(long)]
    pub force_with_lease: bool,

    /// Push every ref with --mirror instead of branches and tags separately
    #[arg(long)]
    pub mirror: bool,
}

pub fn execute(args: SyncAllArgs, ctx: &CommandContext) -> Result<()> {
    let options = ReplicateOptions {
        source: args
            .source
            .unwrap_or_else(|| ctx.settings.replicate.source.clone()),
        force: args.force,
        force_with_lease: args.force_with_lease,
        mirror: args.mirror,
    };

    let output = &ctx.output;
    output.header(&format!(
        "Replicating '{}' to {}",
        options.source, args.destination
    ));

    let replicator = Replicator::new(ctx.git()?);
    let report = replicator.replicate(&args.destination, &options)?;

    if ctx.is_json() {
        ctx.print_json(&report)?;
    } else {
        output.table_row("Source", &format!("{} ({})", report.source, report.source_url));
        output.table_row("Branches", &report.branches.to_string());
        output.table_row("Tags", &report.tags.to_string());
        for step in &report.steps {
            let detail = step.error.as_deref().unwrap_or("pushed");
            output.action_result(&format!("{:?}", step.step), detail, step.success);
        }
    }

    match report.status {
        ReplicationStatus::Complete => {
            output.success(&format!(
                "Replicated {} branches and {} tags to {}",
                report.branches, report.tags, report.destination
            ));
            Ok(())
        }
        ReplicationStatus::NothingToReplicate => {
            bail!("No branches or tags found on '{}'", report.source)
        }
        ReplicationStatus::Partial => bail!("Replication to {} was partial", report.destination),
        ReplicationStatus::Failed => bail!("Replication to {} failed", report.destination),
    }
}
