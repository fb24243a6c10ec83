use serde::Serialize;

use super::{ExecOptions, ExecResult, Vcs};
use crate::error::Result;

/// What `setup_remote` did to a named remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum RemoteSetup {
    Added,
    Updated { previous: String },
    Unchanged,
}

/// Remote definition and remote-tracking queries layered over [`Vcs::execute`]
pub trait RemoteOperations: Vcs {
    /// Fetch URL of a named remote, if the working copy knows it
    fn remote_url(&self, name: &str) -> Option<String> {
        let result = self.execute("remote", &["get-url", name], ExecOptions::SILENT);
        let url = result.output.trim();
        (result.success && !url.is_empty()).then(|| url.to_string())
    }

    /// Explicit `pushurl` entries of `name`; empty when git falls back to the fetch URL
    fn push_urls(&self, name: &str) -> Vec<String> {
        let key = format!("remote.{name}.pushurl");
        let result = self.execute("config", &["--get-all", &key], ExecOptions::SILENT);
        if !result.success {
            return Vec::new();
        }
        result
            .output
            .lines()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Remotes as `(name, fetch url)` in the order git lists them
    fn remotes(&self) -> Vec<(String, String)> {
        let result = self.execute("remote", &["-v"], ExecOptions::SILENT);
        if !result.success {
            return Vec::new();
        }

        let mut remotes: Vec<(String, String)> = Vec::new();
        for line in result.output.lines() {
            let Some((name, rest)) = line.split_once('\t') else {
                continue;
            };
            let url = rest.split(' ').next().unwrap_or_default();
            if name.is_empty() || url.is_empty() {
                continue;
            }
            if !remotes.iter().any(|(existing, _)| existing == name) {
                remotes.push((name.to_string(), url.to_string()));
            }
        }
        remotes
    }

    /// Create `name` or point it at `url`
    fn setup_remote(&self, name: &str, url: &str) -> Result<RemoteSetup> {
        match self.remote_url(name) {
            Some(existing) if existing == url => Ok(RemoteSetup::Unchanged),
            Some(existing) => {
                self.execute("remote", &["set-url", name, url], ExecOptions::ECHO)
                    .into_result()?;
                Ok(RemoteSetup::Updated { previous: existing })
            }
            None => {
                self.execute("remote", &["add", name, url], ExecOptions::ECHO)
                    .into_result()?;
                Ok(RemoteSetup::Added)
            }
        }
    }

    /// Attach an extra push-only URL to `name`
    fn add_push_url(&self, name: &str, url: &str) -> ExecResult {
        self.execute(
            "remote",
            &["set-url", "--add", "--push", name, url],
            ExecOptions::ECHO,
        )
    }

    /// Branches tracked under `refs/remotes/<remote>/`, namespace stripped,
    /// symbolic HEAD excluded
    fn list_remote_branches(&self, remote: &str) -> Vec<String> {
        let result = self.execute("branch", &["-r"], ExecOptions::SILENT);
        if !result.success {
            return Vec::new();
        }

        let prefix = format!("{remote}/");
        result
            .output
            .lines()
            .map(str::trim)
            // symbolic `origin/HEAD -> origin/main`
            .filter(|line| !line.contains(" -> "))
            .filter_map(|line| line.strip_prefix(prefix.as_str()))
            .filter(|branch| !branch.is_empty() && *branch != "HEAD")
            .map(str::to_string)
            .collect()
    }

    /// Fetch every branch and tag from a named remote
    fn fetch_all_with_tags(&self, remote: &str) -> ExecResult {
        self.execute("fetch", &[remote, "--tags"], ExecOptions::ECHO)
    }
}

impl<T: Vcs + ?Sized> RemoteOperations for T {}
