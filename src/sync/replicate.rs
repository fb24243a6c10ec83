use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, SyncError};
use crate::git::{GitOperations, PushFlags, RemoteOperations, Vcs};

#[derive(Debug, Clone, Default)]
pub struct ReplicateOptions {
    /// Name of an existing remote to copy from
    pub source: String,
    pub force: bool,
    pub force_with_lease: bool,
    /// Push every ref wholesale with `--mirror`
    pub mirror: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicationStep {
    Branches,
    Tags,
    Mirror,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: ReplicationStep,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplicationStatus {
    Complete,
    Partial,
    Failed,
    NothingToReplicate,
}

/// Counts reflect what was discovered on the source, not what was pushed
#[derive(Debug, Clone, Serialize)]
pub struct ReplicationReport {
    pub source: String,
    pub source_url: String,
    pub destination: String,
    pub branches: usize,
    pub tags: usize,
    pub steps: Vec<StepOutcome>,
    pub status: ReplicationStatus,
    pub success: bool,
}

impl ReplicationReport {
    fn finish(mut self) -> Self {
        let succeeded = self.steps.iter().filter(|s| s.success).count();
        self.status = if self.branches == 0 && self.tags == 0 {
            ReplicationStatus::NothingToReplicate
        } else if succeeded == self.steps.len() {
            ReplicationStatus::Complete
        } else if succeeded == 0 {
            ReplicationStatus::Failed
        } else {
            ReplicationStatus::Partial
        };
        self.success = self.status == ReplicationStatus::Complete;
        self
    }
}

/// One-shot copy of every branch and tag of a named remote to a new URL
pub struct Replicator<V: Vcs> {
    git: V,
}

impl<V: Vcs> Replicator<V> {
    pub fn new(git: V) -> Self {
        Self { git }
    }

    pub fn git(&self) -> &V {
        &self.git
    }

    pub fn replicate(&self, destination: &str, options: &ReplicateOptions) -> Result<ReplicationReport> {
        let destination = destination.trim();
        let source = options.source.trim();
        if destination.is_empty() {
            return Err(SyncError::configuration("Destination URL is required"));
        }
        if source.is_empty() {
            return Err(SyncError::configuration("Source remote name is required"));
        }
        // both end up as bare git arguments
        if destination.starts_with('-') {
            return Err(SyncError::configuration(format!(
                "Destination URL must not start with '-': {destination}"
            )));
        }
        if source.starts_with('-') {
            return Err(SyncError::configuration(format!(
                "Source remote name must not start with '-': {source}"
            )));
        }

        let source_url = self
            .git
            .remote_url(source)
            .ok_or_else(|| SyncError::RemoteNotFound {
                name: source.to_string(),
            })?;

        info!("Replicating {} ({}) to {}", source, source_url, destination);
        self.git.fetch_all_with_tags(source).into_result()?;

        let branches = self.git.list_remote_branches(source);
        let tags = self.git.list_tags();
        info!("Found {} branches and {} tags", branches.len(), tags.len());

        let mut report = ReplicationReport {
            source: source.to_string(),
            source_url,
            destination: destination.to_string(),
            branches: branches.len(),
            tags: tags.len(),
            steps: Vec::new(),
            status: ReplicationStatus::NothingToReplicate,
            success: false,
        };

        if branches.is_empty() && tags.is_empty() {
            warn!("Nothing to replicate from {}", source);
            return Ok(report.finish());
        }

        let flags = PushFlags {
            force: options.force,
            force_with_lease: options.force_with_lease,
            set_upstream: false,
        };

        if options.mirror {
            let result = self.git.push_all_branches(destination, source, flags, true);
            report.steps.push(step(ReplicationStep::Mirror, result));
            return Ok(report.finish());
        }

        if !branches.is_empty() {
            let result = self.git.push_all_branches(destination, source, flags, false);
            report.steps.push(step(ReplicationStep::Branches, result));
        }
        if !tags.is_empty() {
            let result = self.git.push_all_tags(destination, flags);
            report.steps.push(step(ReplicationStep::Tags, result));
        }

        Ok(report.finish())
    }
}

fn step(step: ReplicationStep, result: crate::git::ExecResult) -> StepOutcome {
    if !result.success {
        warn!("Replication step {:?} failed: {}", step, result.error);
    }
    StepOutcome {
        step,
        success: result.success,
        error: (!result.success).then_some(result.error),
    }
}
