use anyhow::Result;
use clap::Parser;

use git_sync::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
