use super::{ExecOptions, ExecResult, Vcs};
use crate::error::{Result, SyncError};

/// Flags that shape a single `git push`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushFlags {
    pub force: bool,
    pub force_with_lease: bool,
    pub set_upstream: bool,
}

impl PushFlags {
    /// Force-with-lease wins over a plain force when both are set
    pub fn args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.force_with_lease {
            args.push("--force-with-lease");
        } else if self.force {
            args.push("--force");
        }
        if self.set_upstream {
            args.push("--set-upstream");
        }
        args
    }
}

/// Working-copy and branch operations layered over [`Vcs::execute`]
pub trait GitOperations: Vcs {
    fn is_git_repo(&self) -> bool {
        let result = self.execute("rev-parse", &["--is-inside-work-tree"], ExecOptions::SILENT);
        result.success && result.output.trim().eq_ignore_ascii_case("true")
    }

    /// Initialise a repository unless the directory already is one
    fn init(&self) -> ExecResult {
        if self.is_git_repo() {
            return ExecResult::ok("git init", "");
        }
        tracing::info!("Initialising git repository");
        self.execute("init", &[], ExecOptions::ECHO)
    }

    /// Name of the checked-out branch; never guesses one
    fn current_branch(&self) -> Result<String> {
        let result = self.execute("branch", &["--show-current"], ExecOptions::SILENT);
        let branch = result.output.trim();
        if !result.success || branch.is_empty() {
            return Err(SyncError::DetachedHead);
        }
        Ok(branch.to_string())
    }

    fn status(&self) -> ExecResult {
        self.execute("status", &[], ExecOptions::ECHO)
    }

    /// Stage the working tree, or everything including deletions with `all`
    fn add(&self, all: bool) -> ExecResult {
        let path = if all { "--all" } else { "." };
        self.execute("add", &[path], ExecOptions::ECHO)
    }

    /// Whether the index differs from HEAD
    fn has_staged_changes(&self) -> bool {
        !self
            .execute("diff", &["--cached", "--quiet"], ExecOptions::SILENT)
            .success
    }

    fn commit(&self, message: &str, all: bool) -> ExecResult {
        let mut args = vec!["-m", message];
        if all {
            args.push("--all");
        }
        self.execute("commit", &args, ExecOptions::ECHO)
    }

    fn push_to_url(&self, url: &str, branch: &str, flags: PushFlags) -> ExecResult {
        let mut args = flags.args();
        args.push(url);
        args.push(branch);
        self.execute("push", &args, ExecOptions::ECHO)
    }

    /// Fetch `branch` from a raw URL into FETCH_HEAD
    fn fetch_from_url(&self, url: &str, branch: &str) -> ExecResult {
        self.execute("fetch", &[url, branch], ExecOptions::ECHO)
    }

    fn merge_fetch_head(&self, ff_only: bool) -> ExecResult {
        let mut args = vec!["FETCH_HEAD"];
        if ff_only {
            args.push("--ff-only");
        }
        self.execute("merge", &args, ExecOptions::ECHO)
    }

    fn merge_ff_only(&self, reference: &str) -> ExecResult {
        self.execute("merge", &[reference, "--ff-only"], ExecOptions::ECHO)
    }

    fn rebase_onto(&self, onto: &str) -> ExecResult {
        self.execute("rebase", &[onto], ExecOptions::ECHO)
    }

    fn rebase_abort(&self) -> ExecResult {
        self.execute("rebase", &["--abort"], ExecOptions::ECHO)
    }

    fn pull(&self, remote: &str, branch: &str, rebase: bool) -> ExecResult {
        let mut args = vec![remote, branch];
        if rebase {
            args.push("--rebase");
        }
        self.execute("pull", &args, ExecOptions::ECHO)
    }

    fn fetch_remote(&self, remote: &str, branch: Option<&str>) -> ExecResult {
        let mut args = vec![remote];
        if let Some(branch) = branch {
            args.push(branch);
        }
        self.execute("fetch", &args, ExecOptions::ECHO)
    }

    fn list_tags(&self) -> Vec<String> {
        let result = self.execute("tag", &["-l"], ExecOptions::SILENT);
        if !result.success {
            return Vec::new();
        }
        result
            .output
            .lines()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Push every `refs/remotes/<remote>/*` ref to `url` as a branch, or
    /// mirror all refs wholesale when `mirror` is set
    fn push_all_branches(
        &self,
        url: &str,
        remote: &str,
        flags: PushFlags,
        mirror: bool,
    ) -> ExecResult {
        let mut args: Vec<String> = Vec::new();
        if mirror {
            args.extend(flags.args().into_iter().map(str::to_string));
            args.push("--mirror".to_string());
            args.push(url.to_string());
        } else {
            if flags.force_with_lease {
                args.push("--force-with-lease".to_string());
            }
            let prefix = if flags.force && !flags.force_with_lease { "+" } else { "" };
            args.push(url.to_string());
            args.push(format!("{prefix}refs/remotes/{remote}/*:refs/heads/*"));
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.execute("push", &args, ExecOptions::ECHO)
    }

    fn push_all_tags(&self, url: &str, flags: PushFlags) -> ExecResult {
        let mut args = PushFlags {
            set_upstream: false,
            ..flags
        }
        .args();
        args.push("--tags");
        args.push(url);
        self.execute("push", &args, ExecOptions::ECHO)
    }
}

impl<T: Vcs + ?Sized> GitOperations for T {}
