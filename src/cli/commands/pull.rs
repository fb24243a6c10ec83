//! Pull from the primary remote, fetch the mirrors

use anyhow::Result;
use clap::Args;

use super::{CommandContext, finish_run};
use crate::sync::PullOptions;

#[derive(Args, Debug, Default)]
pub struct PullArgs {
    /// Rebase instead of merge when pulling from the primary remote
    #[arg(short, long)]
    pub rebase: bool,

    /// Fast-forward merge from every mirror group too
    #[arg(long)]
    pub merge_mirrors: bool,
}

pub fn execute(args: PullArgs, ctx: &CommandContext) -> Result<()> {
    let options = PullOptions {
        rebase: args.rebase || ctx.settings.pull.rebase,
        merge_mirrors: args.merge_mirrors || ctx.settings.pull.merge_mirrors,
    };
    let engine = ctx.engine()?;

    ctx.output.header("Pulling from remotes");
    let report = engine.pull(&options)?;
    finish_run(ctx, &report)
}
