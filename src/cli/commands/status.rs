//! Remote list plus `git status`

use anyhow::Result;
use clap::Args;

use super::CommandContext;
use super::config::show_remotes;
use crate::git::{GitOperations, RemoteOperations};

#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

pub fn execute(_args: StatusArgs, ctx: &CommandContext) -> Result<()> {
    let loaded = ctx.remotes()?;
    let git = ctx.git()?;

    if ctx.is_json() {
        let status = git.status();
        return ctx.print_json(&serde_json::json!({
            "project_dir": ctx.project_dir.display().to_string(),
            "source": loaded.source,
            "remotes": loaded.remotes,
            "git_remotes": git.remotes(),
            "status": status.success.then_some(status.output),
        }));
    }

    show_remotes(ctx, &loaded);

    let output = &ctx.output;
    output.header("Git remotes");
    let configured = git.remotes();
    if configured.is_empty() {
        output.warning("No git remotes defined yet. Run 'git-sync setup'");
    }
    for (name, url) in &configured {
        output.table_row(name, url);
        for push_url in git.push_urls(name) {
            output.indent(&format!("push: {push_url}"));
        }
    }

    output.header("Working copy");
    let status = git.status();
    if status.success {
        for line in status.output.lines() {
            output.indent(line);
        }
    } else {
        output.warning(&format!("git status failed: {}", status.error));
    }
    Ok(())
}
