//! Push the current branch to every configured remote

use anyhow::Result;
use clap::Args;

use super::{CommandContext, PushFlagArgs, finish_run};

#[derive(Args, Debug, Default)]
pub struct PushArgs {
    #[command(flatten)]
    pub flags: PushFlagArgs,
}

pub fn execute(args: PushArgs, ctx: &CommandContext) -> Result<()> {
    let options = args.flags.resolve(&ctx.settings);
    let engine = ctx.engine()?;

    ctx.output.header(&format!(
        "Pushing to {} remotes (on non-fast-forward: {})",
        engine.registry().len(),
        options.policy
    ));
    let report = engine.push(&options)?;
    finish_run(ctx, &report)
}
