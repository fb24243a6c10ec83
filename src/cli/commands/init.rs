//! Write a sample remote list into the project directory

use anyhow::Result;
use clap::Args;

use super::CommandContext;
use crate::config::write_sample_config;

#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Overwrite an existing .git-remotes.txt
    #[arg(short, long)]
    pub force: bool,
}

pub fn execute(args: InitArgs, ctx: &CommandContext) -> Result<()> {
    let output = &ctx.output;
    output.header("Initializing git-sync");

    let path = write_sample_config(&ctx.project_dir, args.force)?;
    output.success(&format!("Created {}", path.display()));
    output.blank_line();
    output.info("Next steps:");
    output.list_item("Edit the file and list your remote URLs");
    output.list_item("Run 'git-sync setup' to create the git remotes");
    output.list_item("Run 'git-sync push' to push to all of them");
    Ok(())
}
