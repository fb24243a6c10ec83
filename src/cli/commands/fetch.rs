use anyhow::Result;
use clap::Args;

use super::{CommandContext, finish_run};

#[derive(Args, Debug, Default)]
pub struct FetchArgs {}

pub fn execute(_args: FetchArgs, ctx: &CommandContext) -> Result<()> {
    let engine = ctx.engine()?;
    ctx.output.header("Fetching from remotes");
    let report = engine.fetch();
    finish_run(ctx, &report)
}
