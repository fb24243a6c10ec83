//! Multi-remote reconciliation
//!
//! [`SyncEngine`] runs one user-requested operation (push, pull, fetch,
//! commit with optional push, setup) against the resolved remote registry
//! and returns a report; [`Replicator`] copies every branch and tag from a
//! named remote to a new URL. Per-remote failures are recorded in the
//! reports and never abort the remaining remotes.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::git::{PushFlags, RemoteSetup};
use crate::remote::RemoteTarget;

pub mod engine;
pub mod replicate;
pub mod strategy;

pub use engine::SyncEngine;
pub use replicate::{
    ReplicateOptions, ReplicationReport, ReplicationStatus, ReplicationStep, Replicator,
    StepOutcome,
};
pub use strategy::fallback_chain;

/// What to do once a push is still rejected after the upstream retry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NonFastForwardPolicy {
    /// Record the failure and move on
    #[default]
    Skip,
    /// Fetch, rebase onto the fetched head, push again
    Rebase,
    /// Retry with --force-with-lease
    #[serde(alias = "forceWithLease")]
    #[value(alias = "forceWithLease")]
    ForceWithLease,
    /// Retry with --force
    Force,
}

impl fmt::Display for NonFastForwardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NonFastForwardPolicy::Skip => "skip",
            NonFastForwardPolicy::Rebase => "rebase",
            NonFastForwardPolicy::ForceWithLease => "force-with-lease",
            NonFastForwardPolicy::Force => "force",
        };
        f.write_str(name)
    }
}

/// One step of the push fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushStrategy {
    Direct,
    SetUpstreamRetry,
    Rebase,
    ForceWithLease,
    Force,
}

impl fmt::Display for PushStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PushStrategy::Direct => "direct",
            PushStrategy::SetUpstreamRetry => "set-upstream-retry",
            PushStrategy::Rebase => "rebase",
            PushStrategy::ForceWithLease => "force-with-lease",
            PushStrategy::Force => "force",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Push,
    Pull,
    Fetch,
    Merge,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Push => "push",
            Operation::Pull => "pull",
            Operation::Fetch => "fetch",
            Operation::Merge => "merge",
        };
        f.write_str(name)
    }
}

/// Result of one operation against one remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub target: RemoteTarget,
    pub operation: Operation,
    pub success: bool,
    pub error: Option<String>,
    pub strategy: Option<PushStrategy>,
    /// Whether a failure here fails the run
    pub blocking: bool,
}

impl OperationOutcome {
    pub fn succeeded(target: &RemoteTarget, operation: Operation) -> Self {
        Self {
            target: target.clone(),
            operation,
            success: true,
            error: None,
            strategy: None,
            blocking: true,
        }
    }

    pub fn failed(target: &RemoteTarget, operation: Operation, error: impl Into<String>) -> Self {
        Self {
            target: target.clone(),
            operation,
            success: false,
            error: Some(error.into()),
            strategy: None,
            blocking: true,
        }
    }

    pub(crate) fn from_exec(
        target: &RemoteTarget,
        operation: Operation,
        result: &crate::git::ExecResult,
    ) -> Self {
        if result.success {
            Self::succeeded(target, operation)
        } else {
            Self::failed(target, operation, result.error.clone())
        }
    }

    pub fn with_strategy(mut self, strategy: Option<PushStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn non_blocking(mut self) -> Self {
        self.blocking = false;
        self
    }
}

/// Per-remote outcomes of one run, in processing order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub operation: Operation,
    pub branch: Option<String>,
    pub attempted: usize,
    pub succeeded: usize,
    pub outcomes: Vec<OperationOutcome>,
}

impl RunReport {
    pub fn new(operation: Operation, branch: Option<String>) -> Self {
        Self {
            operation,
            branch,
            attempted: 0,
            succeeded: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: OperationOutcome) {
        self.attempted += 1;
        if outcome.success {
            self.succeeded += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Failures that make the run unsuccessful
    pub fn blocking_failures(&self) -> usize {
        self.failures().filter(|o| o.blocking).count()
    }

    pub fn is_complete(&self) -> bool {
        self.blocking_failures() == 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    pub flags: PushFlags,
    pub pull_before_push: bool,
    pub policy: NonFastForwardPolicy,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PullOptions {
    pub rebase: bool,
    pub merge_mirrors: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommitOptions {
    /// Stage deletions too (`git add --all`)
    pub all: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitOutcome {
    Committed,
    /// Index matched HEAD; nothing was committed
    NoChanges,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub commit: CommitOutcome,
    pub push: Option<RunReport>,
}

/// How one remote group was realized in the working copy
#[derive(Debug, Clone, Serialize)]
pub struct GroupSetup {
    pub base_name: String,
    pub remote: String,
    pub url: String,
    pub setup: Option<RemoteSetup>,
    pub push_urls_added: Vec<String>,
    pub errors: Vec<String>,
    /// Members of the group now present in the remote definition
    pub configured: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub groups: Vec<GroupSetup>,
    pub configured: usize,
    pub total: usize,
}

impl SetupReport {
    pub fn is_complete(&self) -> bool {
        self.configured == self.total
    }
}
