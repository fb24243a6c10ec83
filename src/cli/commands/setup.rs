//! Realize the remote groups as git remote definitions

use anyhow::{Result, bail};
use clap::Args;

use super::CommandContext;
use crate::git::RemoteSetup;

#[derive(Args, Debug, Default)]
pub struct SetupArgs {}

pub fn execute(_args: SetupArgs, ctx: &CommandContext) -> Result<()> {
    let engine = ctx.engine()?;
    ctx.output.header("Setting up git remotes");
    let report = engine.setup()?;

    if ctx.is_json() {
        ctx.print_json(&report)?;
    } else {
        let output = &ctx.output;
        for group in &report.groups {
            let action = match &group.setup {
                Some(RemoteSetup::Added) => "added".to_string(),
                Some(RemoteSetup::Updated { previous }) => format!("updated (was {previous})"),
                Some(RemoteSetup::Unchanged) => "unchanged".to_string(),
                None => "failed".to_string(),
            };
            output.action_result(&group.remote, &format!("{} {}", group.url, action), group.errors.is_empty());
            for url in &group.push_urls_added {
                output.indent(&format!("push url added: {url}"));
            }
            for error in &group.errors {
                output.indent(error);
            }
        }
        output.summary("Configured", report.configured, report.total);
    }

    if !report.is_complete() {
        bail!(
            "{} of {} remotes could not be configured",
            report.total - report.configured,
            report.total
        );
    }
    Ok(())
}
