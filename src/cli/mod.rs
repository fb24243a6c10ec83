//! Command-line interface for git-sync
//!
//! clap derive surface, logging setup and dispatch to [`commands`].

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

pub mod commands;
mod output;

pub use output::Output;

use commands::{
    CommandContext, commit, config, fetch, init, pull, push, setup, status, sync_all,
};

/// git-sync - keep one working copy mirrored to many git remotes
#[derive(Parser)]
#[command(
    name = "git-sync",
    author,
    version,
    about = "Mirror commits, branches and tags to multiple git remotes",
    long_about = "git-sync pushes the current branch to every remote listed in \
                  .git-remotes.txt (or GIT_SYNC_REMOTE* variables), pulls from the \
                  primary remote and fetches the mirrors, and can replicate a whole \
                  repository to a new URL."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    pub directory: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom settings file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a sample .git-remotes.txt
    Init(init::InitArgs),
    /// Show the resolved remote list
    Config(config::ConfigArgs),
    /// Show remotes and working copy status
    Status(status::StatusArgs),
    /// Create or update git remotes from the remote list
    Setup(setup::SetupArgs),
    /// Stage and commit, optionally pushing to every remote
    Commit(commit::CommitArgs),
    /// Push the current branch to every remote
    Push(push::PushArgs),
    /// Pull from the primary remote and fetch the mirrors
    Pull(pull::PullArgs),
    /// Fetch from every remote group
    Fetch(fetch::FetchArgs),
    /// Copy all branches and tags of a remote to a new URL
    SyncAll(sync_all::SyncAllArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Change directory if specified
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Failed to change directory to {dir}"))?;
        }

        setup_logging(self.verbose, self.quiet);

        let Some(command) = self.command else {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            return Ok(());
        };

        let ctx = CommandContext::new(self.verbose, self.quiet, self.format, self.config.as_deref())?;

        match command {
            Commands::Init(args) => init::execute(args, &ctx),
            Commands::Config(args) => config::execute(args, &ctx),
            Commands::Status(args) => status::execute(args, &ctx),
            Commands::Setup(args) => setup::execute(args, &ctx),
            Commands::Commit(args) => commit::execute(args, &ctx),
            Commands::Push(args) => push::execute(args, &ctx),
            Commands::Pull(args) => pull::execute(args, &ctx),
            Commands::Fetch(args) => fetch::execute(args, &ctx),
            Commands::SyncAll(args) => sync_all::execute(args, &ctx),
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // Logs go to stderr so --format json stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
