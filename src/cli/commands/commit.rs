//! Stage, commit and optionally push

use anyhow::Result;
use clap::Args;

use super::{CommandContext, PushFlagArgs, check_run, finish_run};
use crate::sync::{CommitOptions, CommitOutcome};

#[derive(Args, Debug, Default)]
pub struct CommitArgs {
    /// Commit message
    pub message: String,

    /// Stage all changes including deletions
    #[arg(short, long)]
    pub all: bool,

    /// Push to every remote after committing
    #[arg(short, long)]
    pub push: bool,

    #[command(flatten)]
    pub flags: PushFlagArgs,
}

pub fn execute(args: CommitArgs, ctx: &CommandContext) -> Result<()> {
    let engine = ctx.engine()?;
    let push_options = args.push.then(|| args.flags.resolve(&ctx.settings));

    let report = engine.commit_and_push(
        &args.message,
        &CommitOptions { all: args.all },
        push_options.as_ref(),
    )?;

    if ctx.is_json() {
        ctx.print_json(&report)?;
        return match &report.push {
            Some(push) => check_run(push),
            None => Ok(()),
        };
    }

    match report.commit {
        CommitOutcome::Committed => ctx.output.success(&format!("Committed: {}", args.message)),
        CommitOutcome::NoChanges => ctx.output.info("No changes to commit"),
    }

    match &report.push {
        Some(push) => finish_run(ctx, push),
        None => Ok(()),
    }
}
