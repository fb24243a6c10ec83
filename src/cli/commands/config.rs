//! Show the resolved remote list

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::CommandContext;
use crate::config::{LoadedRemotes, Settings};
use crate::remote::group_targets;

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Also print the effective tool settings
    #[arg(long)]
    pub settings: bool,
}

#[derive(Serialize)]
struct ConfigView<'a> {
    project_dir: String,
    #[serde(flatten)]
    remotes: &'a LoadedRemotes,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<&'a Settings>,
}

pub fn execute(args: ConfigArgs, ctx: &CommandContext) -> Result<()> {
    let loaded = ctx.remotes()?;

    if ctx.is_json() {
        return ctx.print_json(&ConfigView {
            project_dir: ctx.project_dir.display().to_string(),
            remotes: &loaded,
            settings: args.settings.then_some(&ctx.settings),
        });
    }

    show_remotes(ctx, &loaded);
    if args.settings {
        show_settings(ctx);
    }
    Ok(())
}

/// Remote list in text form; shared with `status`
pub(super) fn show_remotes(ctx: &CommandContext, loaded: &LoadedRemotes) {
    let output = &ctx.output;
    output.header("Remote configuration");
    output.table_row("Source", &loaded.source.describe());
    output.table_row("Project", &ctx.project_dir.display().to_string());
    output.table_row("Remotes", &loaded.remotes.len().to_string());
    output.blank_line();

    for remote in &loaded.remotes {
        let mut label = remote.name.clone();
        if let Some(line) = remote.source_line {
            label.push_str(&format!(" (line {line})"));
        }
        if remote.standalone {
            label.push_str(" [standalone]");
        }
        output.action_result(&label, &remote.url, remote.enabled);
    }

    let enabled: Vec<_> = loaded.remotes.iter().filter(|r| r.enabled).cloned().collect();
    let grouped: Vec<_> = group_targets(&enabled)
        .into_iter()
        .filter(|g| !g.extras.is_empty())
        .collect();
    if !grouped.is_empty() {
        output.blank_line();
        output.info("Push groups:");
        for group in grouped {
            let extras: Vec<&str> = group.extras.iter().map(|e| e.name.as_str()).collect();
            output.list_item(&format!("{} -> also {}", group.primary.name, extras.join(", ")));
        }
    }
}

fn show_settings(ctx: &CommandContext) {
    let output = &ctx.output;
    let settings = &ctx.settings;
    output.header("Settings");
    output.key_value("git.binary:", &settings.git.binary, false);
    output.key_value("git.echo_commands:", &settings.git.echo_commands.to_string(), false);
    output.key_value("push.on_non_ff:", &settings.push.on_non_ff.to_string(), true);
    output.key_value(
        "push.pull_before_push:",
        &settings.push.pull_before_push.to_string(),
        false,
    );
    output.key_value("push.set_upstream:", &settings.push.set_upstream.to_string(), false);
    output.key_value("pull.rebase:", &settings.pull.rebase.to_string(), false);
    output.key_value("pull.merge_mirrors:", &settings.pull.merge_mirrors.to_string(), false);
    output.key_value("replicate.source:", &settings.replicate.source, false);
    output.key_value("registry.disabled:", &settings.registry.disabled.join(", "), false);
}
