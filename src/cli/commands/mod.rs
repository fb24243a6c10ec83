use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;

use super::{Output, OutputFormat};
use crate::config::{LoadedRemotes, Settings, load_remotes_from_process};
use crate::error::SyncError;
use crate::git::{GitCommand, PushFlags};
use crate::remote::RemoteRegistry;
use crate::sync::{NonFastForwardPolicy, OperationOutcome, PushOptions, RunReport, SyncEngine};

pub mod commit;
pub mod config;
pub mod fetch;
pub mod init;
pub mod pull;
pub mod push;
pub mod setup;
pub mod status;
pub mod sync_all;

/// Everything a subcommand needs, resolved once per invocation
pub struct CommandContext {
    pub output: Output,
    pub settings: Settings,
    pub project_dir: PathBuf,
    pub format: OutputFormat,
}

impl CommandContext {
    pub fn new(
        verbose: u8,
        quiet: bool,
        format: OutputFormat,
        custom_config: Option<&str>,
    ) -> Result<Self> {
        let project_dir = std::env::current_dir().context("Failed to read current directory")?;
        let settings = Settings::load(&project_dir, custom_config.map(Path::new))
            .context("Failed to load settings")?;

        // JSON output must be the only thing on stdout
        let quiet = quiet || format == OutputFormat::Json;

        Ok(Self {
            output: Output::new(verbose > 0, quiet),
            settings,
            project_dir,
            format,
        })
    }

    /// Git gateway bound to the project directory
    pub fn git(&self) -> Result<GitCommand> {
        let git = GitCommand::new(&self.settings.git.binary, &self.project_dir)?;
        Ok(git.with_echo(self.settings.git.echo_commands && !self.output.is_quiet()))
    }

    /// Remote list with `registry.disabled` applied
    pub fn remotes(&self) -> Result<LoadedRemotes> {
        let mut loaded = load_remotes_from_process(&self.project_dir)?;
        loaded.disable(&self.settings.registry.disabled);
        for entry in &loaded.rejected {
            self.output.warning(&format!("Skipping {}", SyncError::from(entry)));
        }
        Ok(loaded)
    }

    pub fn registry(&self) -> Result<RemoteRegistry> {
        let loaded = self.remotes()?;
        self.output.verbose(&format!(
            "Loaded {} remotes from {}",
            loaded.remotes.len(),
            loaded.source.describe()
        ));
        Ok(RemoteRegistry::new(loaded.remotes)?)
    }

    pub fn engine(&self) -> Result<SyncEngine<GitCommand>> {
        let registry = self.registry()?;
        Ok(SyncEngine::new(self.git()?, registry))
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Push flags shared by `push` and `commit --push`
#[derive(Args, Debug, Clone, Default)]
pub struct PushFlagArgs {
    /// Force push (overwrites remote history)
    #[arg(short, long)]
    pub force: bool,

    /// Force push only if the remote tip is the one last seen
    #[arg(long)]
    pub force_with_lease: bool,

    /// Set upstream tracking for the pushed branch
    #[arg(short = 'u', long)]
    pub set_upstream: bool,

    /// Fetch and fast-forward from each remote before pushing to it
    #[arg(long)]
    pub pull_before_push: bool,

    /// What to do when a push is rejected as non-fast-forward
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_non_ff: Option<NonFastForwardPolicy>,
}

impl PushFlagArgs {
    /// Combine flags with settings defaults; flags only ever switch options on
    pub fn resolve(&self, settings: &Settings) -> PushOptions {
        PushOptions {
            flags: PushFlags {
                force: self.force,
                force_with_lease: self.force_with_lease,
                set_upstream: self.set_upstream || settings.push.set_upstream,
            },
            pull_before_push: self.pull_before_push || settings.push.pull_before_push,
            policy: self.on_non_ff.unwrap_or(settings.push.on_non_ff),
        }
    }
}

fn outcome_detail(outcome: &OperationOutcome) -> String {
    let mut detail = format!("{} {}", outcome.operation, outcome.target.url);
    if let Some(strategy) = outcome.strategy {
        detail.push_str(&format!(" [{strategy}]"));
    }
    if let Some(error) = &outcome.error {
        detail.push_str(&format!(": {error}"));
    }
    detail
}

/// Print a run report and fail when it has blocking failures
pub fn finish_run(ctx: &CommandContext, report: &RunReport) -> Result<()> {
    if ctx.is_json() {
        ctx.print_json(report)?;
    } else {
        let output = &ctx.output;
        output.header(&format!("{} results", report.operation));
        for outcome in &report.outcomes {
            if outcome.success || outcome.blocking {
                output.action_result(&outcome.target.name, &outcome_detail(outcome), outcome.success);
            } else {
                output.warning(&format!(
                    "{}: {} (not blocking)",
                    outcome.target.name,
                    outcome_detail(outcome)
                ));
            }
        }
        output.summary("Succeeded", report.succeeded, report.attempted);
    }

    check_run(report)
}

pub fn check_run(report: &RunReport) -> Result<()> {
    let failed = report.blocking_failures();
    if failed > 0 {
        bail!("{} of {} remotes failed", failed, report.attempted);
    }
    Ok(())
}
