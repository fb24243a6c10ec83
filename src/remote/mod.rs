//! Remote registry and suffix grouping
//!
//! Naming rule: a remote called `<base>-<digits>` belongs to the same
//! logical repository as `<base>`. Within a group the first-declared member
//! is the primary (fetch/pull source); later members are extra push
//! destinations only. Remotes flagged `standalone` never join a group.

use serde::Serialize;

use crate::error::{Result, SyncError};

/// One configured remote endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteTarget {
    pub name: String,
    pub url: String,
    pub enabled: bool,
    /// Line (or env index + 1) the entry came from
    pub source_line: Option<usize>,
    /// Opted out of suffix grouping
    pub standalone: bool,
}

impl RemoteTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            enabled: true,
            source_line: None,
            standalone: false,
        }
    }

    /// Group key: the name without a trailing `-<digits>` suffix
    pub fn base_name(&self) -> &str {
        if self.standalone {
            &self.name
        } else {
            base_name(&self.name)
        }
    }
}

/// Remotes sharing a base name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteGroup {
    pub base_name: String,
    pub primary: RemoteTarget,
    pub extras: Vec<RemoteTarget>,
}

impl RemoteGroup {
    pub fn members(&self) -> impl Iterator<Item = &RemoteTarget> {
        std::iter::once(&self.primary).chain(self.extras.iter())
    }
}

/// Strip one trailing `-<digits>` suffix; `"origin-2"` -> `"origin"`
pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((base, digits))
            if !base.is_empty()
                && !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}

#[derive(PartialEq, Eq)]
enum GroupKey<'a> {
    Base(&'a str),
    Standalone(&'a str),
}

impl<'a> GroupKey<'a> {
    fn of(target: &'a RemoteTarget) -> Self {
        if target.standalone {
            GroupKey::Standalone(&target.name)
        } else {
            GroupKey::Base(base_name(&target.name))
        }
    }
}

/// Group targets by base name, preserving declaration order
pub fn group_targets(targets: &[RemoteTarget]) -> Vec<RemoteGroup> {
    let mut keys: Vec<GroupKey<'_>> = Vec::new();
    let mut groups: Vec<RemoteGroup> = Vec::new();

    for target in targets {
        let key = GroupKey::of(target);
        match keys.iter().position(|existing| *existing == key) {
            Some(index) => groups[index].extras.push(target.clone()),
            None => {
                keys.push(key);
                groups.push(RemoteGroup {
                    base_name: target.base_name().to_string(),
                    primary: target.clone(),
                    extras: Vec::new(),
                });
            }
        }
    }

    groups
}

/// The enabled remotes for one invocation
#[derive(Debug, Clone)]
pub struct RemoteRegistry {
    targets: Vec<RemoteTarget>,
}

impl RemoteRegistry {
    /// Keep enabled entries; fails with [`SyncError::EmptyRegistry`] if none remain
    pub fn new(entries: impl IntoIterator<Item = RemoteTarget>) -> Result<Self> {
        let targets: Vec<RemoteTarget> = entries.into_iter().filter(|t| t.enabled).collect();
        if targets.is_empty() {
            return Err(SyncError::EmptyRegistry);
        }
        Ok(Self { targets })
    }

    /// Every enabled target, in declaration order (push destinations)
    pub fn targets(&self) -> &[RemoteTarget] {
        &self.targets
    }

    pub fn groups(&self) -> Vec<RemoteGroup> {
        group_targets(&self.targets)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Filter and group raw entries in one step
pub fn resolve(entries: impl IntoIterator<Item = RemoteTarget>) -> Result<Vec<RemoteGroup>> {
    Ok(RemoteRegistry::new(entries)?.groups())
}
