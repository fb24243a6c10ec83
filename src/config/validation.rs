//! Remote URL and remote name validation
//!
//! Accepted URL shapes: `http(s)://host/owner/repo`, scp-like SSH
//! `user@host:owner/repo` and `git://host/owner/repo`. A `.git` suffix is
//! recommended but not required. Remote names end up as plain git
//! arguments, so anything git could read as an option is refused.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Shortest URL that can possibly name a repository
pub const MIN_URL_LEN: usize = 10;

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://\S+/\S+/\S+?(\.git)?$").expect("valid http url regex")
});

static SSH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\S+@\S+:[\w.-]+/\S+?(\.git)?$").expect("valid ssh url regex")
});

static GIT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^git://\S+/\S+/\S+?(\.git)?$").expect("valid git url regex")
});

/// Why a candidate URL was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlRejection {
    Empty,
    TooShort,
    NoProtocolMatch,
}

impl fmt::Display for UrlRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlRejection::Empty => write!(f, "URL is empty"),
            UrlRejection::TooShort => write!(f, "too short (minimum {MIN_URL_LEN} characters)"),
            UrlRejection::NoProtocolMatch => {
                write!(f, "no protocol match (expected https://, http://, git:// or user@host:path)")
            }
        }
    }
}

/// Check a remote URL against the accepted shapes
pub fn validate_git_url(url: &str) -> Result<(), UrlRejection> {
    let url = url.trim();
    if url.is_empty() {
        return Err(UrlRejection::Empty);
    }
    if url.len() < MIN_URL_LEN {
        return Err(UrlRejection::TooShort);
    }
    if url.starts_with('-') {
        return Err(UrlRejection::NoProtocolMatch);
    }

    if HTTP_URL.is_match(url) || SSH_URL.is_match(url) || GIT_URL.is_match(url) {
        Ok(())
    } else {
        Err(UrlRejection::NoProtocolMatch)
    }
}

/// Why a remote name was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRejection {
    Empty,
    LeadingDash,
    InvalidCharacter(char),
    InvalidSequence(&'static str),
}

impl fmt::Display for NameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRejection::Empty => write!(f, "empty remote name"),
            NameRejection::LeadingDash => write!(f, "remote name must not start with '-'"),
            NameRejection::InvalidCharacter(c) => {
                write!(f, "remote name contains invalid character {c:?}")
            }
            NameRejection::InvalidSequence(seq) => {
                write!(f, "remote name contains invalid sequence {seq:?}")
            }
        }
    }
}

/// Check a remote name against what git accepts under `refs/remotes/`
pub fn validate_remote_name(name: &str) -> Result<(), NameRejection> {
    if name.is_empty() {
        return Err(NameRejection::Empty);
    }
    if name.starts_with('-') {
        return Err(NameRejection::LeadingDash);
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(*c))
    {
        return Err(NameRejection::InvalidCharacter(c));
    }
    for seq in ["..", "@{", "//"] {
        if name.contains(seq) {
            return Err(NameRejection::InvalidSequence(seq));
        }
    }
    if name.ends_with(".lock") {
        return Err(NameRejection::InvalidSequence(".lock"));
    }
    if name.starts_with('.') || name.ends_with('.') || name.ends_with('/') {
        return Err(NameRejection::InvalidSequence("."));
    }
    Ok(())
}
