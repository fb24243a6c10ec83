use tracing::{info, warn};

use super::strategy::{fallback_chain, flags_for};
use super::{
    CommitOptions, CommitOutcome, CommitReport, GroupSetup, Operation, OperationOutcome,
    PullOptions, PushOptions, PushStrategy, RunReport, SetupReport,
};
use crate::error::Result;
use crate::git::{ExecResult, GitOperations, RemoteOperations, Vcs};
use crate::remote::{RemoteGroup, RemoteRegistry, RemoteTarget};

/// Drives push/pull/fetch/commit/setup across every configured remote
pub struct SyncEngine<V: Vcs> {
    git: V,
    registry: RemoteRegistry,
}

impl<V: Vcs> SyncEngine<V> {
    pub fn new(git: V, registry: RemoteRegistry) -> Self {
        Self { git, registry }
    }

    pub fn registry(&self) -> &RemoteRegistry {
        &self.registry
    }

    pub fn git(&self) -> &V {
        &self.git
    }

    /// Push the current branch to every enabled target independently
    ///
    /// Targets are raw registry entries, not groups: `origin` and `origin-2`
    /// are separate destinations here.
    pub fn push(&self, options: &PushOptions) -> Result<RunReport> {
        let branch = self.git.current_branch()?;
        let chain = fallback_chain(options.flags, options.policy);
        let mut report = RunReport::new(Operation::Push, Some(branch.clone()));

        for target in self.registry.targets() {
            let outcome = self.push_target(target, &branch, options, &chain);
            if outcome.success {
                info!("Pushed {} to {}", branch, target.name);
            } else {
                warn!(
                    "Push to {} failed: {}",
                    target.name,
                    outcome.error.as_deref().unwrap_or_default()
                );
            }
            report.record(outcome);
        }

        Ok(report)
    }

    fn push_target(
        &self,
        target: &RemoteTarget,
        branch: &str,
        options: &PushOptions,
        chain: &[PushStrategy],
    ) -> OperationOutcome {
        info!("Pushing {} to {} ({})", branch, target.name, target.url);

        if options.pull_before_push {
            if let Err(error) = self.pull_before_push(target, branch) {
                return OperationOutcome::failed(target, Operation::Push, error);
            }
        }

        let mut last_failure: Option<(PushStrategy, String)> = None;
        for &strategy in chain {
            let result = self.attempt(strategy, target, branch, options);
            if result.success {
                return OperationOutcome::succeeded(target, Operation::Push)
                    .with_strategy(Some(strategy));
            }
            tracing::debug!("{} push to {} rejected: {}", strategy, target.name, result.error);
            last_failure = Some((strategy, result.error));
        }

        match last_failure {
            Some((strategy, error)) => {
                OperationOutcome::failed(target, Operation::Push, error).with_strategy(Some(strategy))
            }
            None => OperationOutcome::failed(target, Operation::Push, "no push strategy attempted"),
        }
    }

    /// Fast-forward onto the target's tip before pushing
    ///
    /// A failed fetch only warns (the branch may not exist there yet); a
    /// failed fast-forward merge means the histories diverged.
    fn pull_before_push(&self, target: &RemoteTarget, branch: &str) -> std::result::Result<(), String> {
        let fetched = self.git.fetch_from_url(&target.url, branch);
        if !fetched.success {
            warn!("Fetch from {} failed, pushing anyway: {}", target.name, fetched.error);
            return Ok(());
        }

        let merged = self.git.merge_fetch_head(true);
        if merged.success {
            Ok(())
        } else {
            Err(format!(
                "{} has diverged from {}, fast-forward merge failed: {}",
                branch, target.name, merged.error
            ))
        }
    }

    fn attempt(
        &self,
        strategy: PushStrategy,
        target: &RemoteTarget,
        branch: &str,
        options: &PushOptions,
    ) -> ExecResult {
        if strategy == PushStrategy::Rebase {
            return self.rebase_and_push(target, branch, options);
        }
        self.git
            .push_to_url(&target.url, branch, flags_for(strategy, options.flags))
    }

    fn rebase_and_push(&self, target: &RemoteTarget, branch: &str, options: &PushOptions) -> ExecResult {
        let fetched = self.git.fetch_from_url(&target.url, branch);
        if !fetched.success {
            return fetched;
        }

        let rebased = self.git.rebase_onto("FETCH_HEAD");
        if !rebased.success {
            warn!("Rebase onto {} failed, aborting", target.name);
            let aborted = self.git.rebase_abort();
            if !aborted.success {
                warn!("rebase --abort failed: {}", aborted.error);
            }
            return rebased;
        }

        self.git.push_to_url(
            &target.url,
            branch,
            flags_for(PushStrategy::Rebase, options.flags),
        )
    }

    /// Pull from the first group's primary; fetch every other group
    pub fn pull(&self, options: &PullOptions) -> Result<RunReport> {
        let branch = self.git.current_branch()?;
        let groups = self.registry.groups();
        let mut report = RunReport::new(Operation::Pull, Some(branch.clone()));

        let mut groups = groups.iter();
        if let Some(first) = groups.next() {
            let source = &first.primary;
            info!("Pulling {} from {}", branch, source.name);
            let result = self.git.pull(&source.name, &branch, options.rebase);
            report.record(OperationOutcome::from_exec(source, Operation::Pull, &result));
        }

        for group in groups {
            let mirror = &group.primary;
            let fetched = self.git.fetch_remote(&mirror.name, Some(&branch));
            report.record(OperationOutcome::from_exec(mirror, Operation::Fetch, &fetched));

            if fetched.success && options.merge_mirrors {
                let reference = format!("{}/{}", mirror.name, branch);
                let merged = self.git.merge_ff_only(&reference);
                if !merged.success {
                    warn!("Fast-forward from {} failed: {}", reference, merged.error);
                }
                report.record(
                    OperationOutcome::from_exec(mirror, Operation::Merge, &merged).non_blocking(),
                );
            }
        }

        Ok(report)
    }

    /// One fetch per group primary
    pub fn fetch(&self) -> RunReport {
        let mut report = RunReport::new(Operation::Fetch, None);
        for group in self.registry.groups() {
            let result = self.git.fetch_remote(&group.primary.name, None);
            report.record(OperationOutcome::from_exec(
                &group.primary,
                Operation::Fetch,
                &result,
            ));
        }
        report
    }

    /// Stage and commit; an unchanged index is reported, not committed
    pub fn commit(&self, message: &str, options: &CommitOptions) -> Result<CommitOutcome> {
        self.git.add(options.all).into_result()?;

        if !self.git.has_staged_changes() {
            info!("No changes to commit");
            return Ok(CommitOutcome::NoChanges);
        }

        self.git.commit(message, options.all).into_result()?;
        Ok(CommitOutcome::Committed)
    }

    /// Commit, then push with the same flags when `push` is given
    pub fn commit_and_push(
        &self,
        message: &str,
        options: &CommitOptions,
        push: Option<&PushOptions>,
    ) -> Result<CommitReport> {
        let commit = self.commit(message, options)?;
        let push = match push {
            Some(push_options) => Some(self.push(push_options)?),
            None => None,
        };
        Ok(CommitReport { commit, push })
    }

    /// Create or update one git remote per group; extras become push URLs
    pub fn setup(&self) -> Result<SetupReport> {
        self.git.init().into_result()?;

        let groups: Vec<GroupSetup> = self
            .registry
            .groups()
            .iter()
            .map(|group| self.setup_group(group))
            .collect();

        let configured = groups.iter().map(|g| g.configured).sum();
        Ok(SetupReport {
            groups,
            configured,
            total: self.registry.len(),
        })
    }

    fn setup_group(&self, group: &RemoteGroup) -> GroupSetup {
        let primary = &group.primary;
        let mut entry = GroupSetup {
            base_name: group.base_name.clone(),
            remote: primary.name.clone(),
            url: primary.url.clone(),
            setup: None,
            push_urls_added: Vec::new(),
            errors: Vec::new(),
            configured: 0,
        };

        match self.git.setup_remote(&primary.name, &primary.url) {
            Ok(setup) => {
                entry.setup = Some(setup);
                entry.configured += 1;
            }
            Err(e) => {
                warn!("Could not configure remote {}: {}", primary.name, e);
                entry.errors.push(e.to_string());
                return entry;
            }
        }

        if group.extras.is_empty() {
            return entry;
        }

        // Once any pushurl exists git stops pushing to `url`, so the
        // primary URL is registered alongside the extras.
        let mut present = self.git.push_urls(&primary.name);
        for member in group.members() {
            if present.contains(&member.url) {
                if member.name != primary.name {
                    entry.configured += 1;
                }
                continue;
            }

            let result = self.git.add_push_url(&primary.name, &member.url);
            if result.success {
                present.push(member.url.clone());
                entry.push_urls_added.push(member.url.clone());
                if member.name != primary.name {
                    entry.configured += 1;
                }
            } else {
                warn!("Could not add push URL {} to {}: {}", member.url, primary.name, result.error);
                entry.errors.push(result.error);
            }
        }

        entry
    }
}
