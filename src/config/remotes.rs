//! Remote list loading
//!
//! Remotes come either from environment variables or from a plain text file
//! in the project directory. When the environment yields any entry the file
//! is ignored entirely.
//!
//! File format, one remote per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! https://github.com/acme/widgets.git          # name generated: widgets
//! backup https://gitlab.com/acme/widgets.git   # explicit name
//! [mirror] git@gitee.com:acme/widgets.git      # bracketed name
//! build-2! https://ci.example.com/acme/b.git   # trailing ! opts out of grouping
//! ```
//!
//! A `#` preceded by whitespace starts an inline comment. Whatever remains
//! must be a single URL or a name followed by a single URL.

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::validation::{validate_git_url, validate_remote_name};
use crate::error::{Result, SyncError};
use crate::remote::RemoteTarget;

/// File names searched in the project directory, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".git-remotes.txt",
    "git-remotes.txt",
    ".git-remotes",
    "git-remotes",
];

const ENV_REMOTES: &str = "GIT_SYNC_REMOTES";
const ENV_REMOTE: &str = "GIT_SYNC_REMOTE_";
const ENV_REMOTE_URL: &str = "GIT_SYNC_REMOTE_URL_";
const ENV_REMOTE_NAME: &str = "GIT_SYNC_REMOTE_NAME_";

static REPO_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/]+?)\.git$").expect("valid repo segment regex"));

/// Where a remote list was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum ConfigSource {
    File(PathBuf),
    Environment,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ConfigSource::Environment => "environment variables".to_string(),
        }
    }
}

/// A configuration entry that was dropped, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEntry {
    pub line: usize,
    pub value: String,
    pub reason: String,
}

impl From<&RejectedEntry> for SyncError {
    fn from(entry: &RejectedEntry) -> Self {
        SyncError::Validation {
            line: entry.line,
            reason: format!("{} ({})", entry.reason, entry.value),
        }
    }
}

/// Result of reading the remote list
#[derive(Debug, Clone, Serialize)]
pub struct LoadedRemotes {
    pub source: ConfigSource,
    pub remotes: Vec<RemoteTarget>,
    pub rejected: Vec<RejectedEntry>,
}

impl LoadedRemotes {
    /// Mark the named remotes as disabled
    pub fn disable(&mut self, names: &[String]) {
        for remote in &mut self.remotes {
            if names.iter().any(|name| name == &remote.name) {
                remote.enabled = false;
            }
        }
    }
}

/// Look for a remote list file in `project_dir`
pub fn find_config_file(project_dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|path| path.is_file())
}

/// Load the remote list, preferring the environment over a file
pub fn load_remotes<F>(project_dir: &Path, env: F) -> Result<LoadedRemotes>
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = parse_env(env);
    if !from_env.remotes.is_empty() {
        tracing::debug!("Using {} remotes from environment", from_env.remotes.len());
        return Ok(from_env);
    }

    let path = find_config_file(project_dir)
        .ok_or_else(|| SyncError::configuration("No remote configuration found"))?;
    tracing::debug!("Reading remotes from {}", path.display());

    let content = std::fs::read_to_string(&path).map_err(|e| {
        SyncError::configuration(format!("Failed to read {}: {e}", path.display()))
    })?;

    let (remotes, rejected) = parse_config_content(&content);
    for entry in &rejected {
        tracing::warn!("Skipping line {}: {} ({})", entry.line, entry.reason, entry.value);
    }
    if remotes.is_empty() {
        return Err(SyncError::configuration(format!(
            "{} contains no valid remotes",
            path.display()
        )));
    }

    Ok(LoadedRemotes {
        source: ConfigSource::File(path),
        remotes,
        rejected,
    })
}

/// Load using the process environment
pub fn load_remotes_from_process(project_dir: &Path) -> Result<LoadedRemotes> {
    load_remotes(project_dir, |key| std::env::var(key).ok())
}

/// Parse remote list file content
pub fn parse_config_content(content: &str) -> (Vec<RemoteTarget>, Vec<RejectedEntry>) {
    let mut remotes: Vec<RemoteTarget> = Vec::new();
    let mut rejected = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = strip_inline_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        match parse_remote_line(line, line_number, &remotes) {
            Ok(remote) => remotes.push(remote),
            Err(entry) => rejected.push(entry),
        }
    }

    (remotes, rejected)
}

/// Cut a line at the first `#` that starts it or follows whitespace
fn strip_inline_comment(line: &str) -> &str {
    let mut previous = None;
    for (at, c) in line.char_indices() {
        if c == '#' && previous.is_none_or(char::is_whitespace) {
            return &line[..at];
        }
        previous = Some(c);
    }
    line
}

fn parse_remote_line(
    line: &str,
    line_number: usize,
    existing: &[RemoteTarget],
) -> std::result::Result<RemoteTarget, RejectedEntry> {
    let reject = |value: &str, reason: String| RejectedEntry {
        line: line_number,
        value: value.to_string(),
        reason,
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (name, url) = match *tokens.as_slice() {
        [url] => (None, url),
        [first, url] => {
            let name = first
                .strip_prefix('[')
                .and_then(|n| n.strip_suffix(']'))
                .unwrap_or(first);
            (Some(name), url)
        }
        _ => {
            return Err(reject(
                line,
                format!("expected `[name] url`, found {} fields", tokens.len()),
            ));
        }
    };

    if let Err(reason) = validate_git_url(url) {
        return Err(reject(url, format!("invalid git URL: {reason}")));
    }

    let names: Vec<&str> = existing.iter().map(|r| r.name.as_str()).collect();
    let mut remote = match name {
        Some(raw) => {
            let (name, standalone) = match raw.strip_suffix('!') {
                Some(stripped) => (stripped, true),
                None => (raw, false),
            };
            if let Err(reason) = validate_remote_name(name) {
                return Err(reject(raw, format!("invalid remote name: {reason}")));
            }
            if names.contains(&name) {
                return Err(reject(name, "duplicate remote name".to_string()));
            }
            let mut remote = RemoteTarget::new(name, url);
            remote.standalone = standalone;
            remote
        }
        None => {
            let name = generate_remote_name(url, existing.len(), &names);
            if let Err(reason) = validate_remote_name(&name) {
                return Err(reject(url, format!("invalid remote name {name:?}: {reason}")));
            }
            RemoteTarget::new(name, url)
        }
    };
    remote.source_line = Some(line_number);
    Ok(remote)
}

/// Parse the three environment forms, concatenated in order
pub fn parse_env<F>(env: F) -> LoadedRemotes
where
    F: Fn(&str) -> Option<String>,
{
    let mut remotes: Vec<RemoteTarget> = Vec::new();
    let mut rejected = Vec::new();

    let mut push = |url: &str, name: Option<String>, index: usize, key: String| {
        let mut reject = |value: &str, reason: String| {
            tracing::warn!("Ignoring {}: {}", key, reason);
            rejected.push(RejectedEntry {
                line: index + 1,
                value: value.to_string(),
                reason: format!("{key}: {reason}"),
            });
        };
        if let Err(reason) = validate_git_url(url) {
            reject(url, reason.to_string());
            return;
        }
        let name = name.unwrap_or_else(|| {
            let names: Vec<&str> = remotes.iter().map(|r| r.name.as_str()).collect();
            generate_remote_name(url, index, &names)
        });
        if let Err(reason) = validate_remote_name(&name) {
            reject(&name, format!("invalid remote name: {reason}"));
            return;
        }
        let mut remote = RemoteTarget::new(name, url);
        remote.source_line = Some(index + 1);
        remotes.push(remote);
    };

    if let Some(list) = env(ENV_REMOTES) {
        for (index, url) in list.split(',').map(str::trim).enumerate() {
            if !url.is_empty() {
                push(url, None, index, ENV_REMOTES.to_string());
            }
        }
    }

    let mut index = 0;
    while let Some(url) = non_empty(env(&format!("{ENV_REMOTE}{index}"))) {
        push(url.trim(), None, index, format!("{ENV_REMOTE}{index}"));
        index += 1;
    }

    let mut index = 0;
    while let Some(url) = non_empty(env(&format!("{ENV_REMOTE_URL}{index}"))) {
        let name = non_empty(env(&format!("{ENV_REMOTE_NAME}{index}"))).map(|n| n.trim().to_string());
        push(url.trim(), name, index, format!("{ENV_REMOTE_URL}{index}"));
        index += 1;
    }

    LoadedRemotes {
        source: ConfigSource::Environment,
        remotes,
        rejected,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Derive a remote name from the URL's last `<segment>.git`, falling back
/// to `origin` / `remote<N>`; collisions get a `-2`, `-3`, ... suffix
pub fn generate_remote_name(url: &str, index: usize, existing: &[&str]) -> String {
    let base = REPO_SEGMENT
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| {
            if index == 0 {
                "origin".to_string()
            } else {
                format!("remote{}", index + 1)
            }
        });

    let mut candidate = base.clone();
    let mut suffix = 1;
    while existing.contains(&candidate.as_str()) {
        suffix += 1;
        candidate = format!("{base}-{suffix}");
    }
    candidate
}

/// Write the sample remote list to `project_dir/.git-remotes.txt`
pub fn write_sample_config(project_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let path = project_dir.join(CONFIG_FILE_NAMES[0]);
    if path.exists() && !overwrite {
        return Err(SyncError::configuration(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    std::fs::write(&path, SAMPLE_CONFIG)?;
    Ok(path)
}

pub const SAMPLE_CONFIG: &str = "\
# git-sync remote list
# One remote per line. Supported forms:

# Plain URL (name derived from the repository name)
https://github.com/username/repository.git

# Named: name URL
origin https://github.com/username/repo1.git
backup https://gitee.com/username/repo1.git

# Bracketed name
[company] https://git.company.com/team/project.git
[mirror] https://mirror.example.com/user/repo.git

# Names ending in -<number> (repo1-2, repo1-3) are extra push URLs of the
# same logical remote. Add a trailing ! to opt out: [build-2!] URL

# Blank lines and lines starting with # are ignored.

# Accepted protocols:
#   HTTPS: https://github.com/user/repo.git
#   SSH:   git@github.com:user/repo.git
#   GIT:   git://git.example.com/user/repo.git
";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_generate_remote_name() {
        assert_eq!(
            generate_remote_name("https://github.com/acme/widgets.git", 0, &[]),
            "widgets"
        );
        assert_eq!(
            generate_remote_name("https://gitee.com/acme/widgets.git", 1, &["widgets"]),
            "widgets-2"
        );
        assert_eq!(
            generate_remote_name("git@x.org:acme/widgets.git", 2, &["widgets", "widgets-2"]),
            "widgets-3"
        );
        assert_eq!(generate_remote_name("https://h.com/acme/widgets", 0, &[]), "origin");
        assert_eq!(generate_remote_name("https://h.com/acme/widgets", 2, &[]), "remote3");
    }

    #[test]
    fn test_parse_all_line_forms() {
        let content = "
# sample
https://github.com/user/repo1.git
https://gitee.com/user/repo1.git
backup https://gitlab.com/user/repo1.git
[company] git@git.company.com:team/project.git
build-2! https://ci.example.com/team/build.git
";
        let (remotes, rejected) = parse_config_content(content);
        assert!(rejected.is_empty());

        let names: Vec<&str> = remotes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["repo1", "repo1-2", "backup", "company", "build-2"]);
        assert_eq!(remotes[0].source_line, Some(3));
        assert_eq!(remotes[3].url, "git@git.company.com:team/project.git");
        assert!(remotes[4].standalone);
        assert!(!remotes[0].standalone);
        assert!(remotes.iter().all(|r| r.enabled));
    }

    #[test]
    fn test_invalid_lines_are_skipped_with_diagnostics() {
        let content = "not-a-url\nhttps://github.com/user/ok.git\nfoo http://x\n";
        let (remotes, rejected) = parse_config_content(content);

        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].name, "ok");
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].line, 1);
        assert!(rejected[0].reason.contains("too short"));
        assert_eq!(rejected[1].line, 3);
    }

    #[test]
    fn test_inline_comments_are_stripped() {
        let content = "
https://github.com/acme/widgets.git          # name generated: widgets
backup https://gitlab.com/acme/widgets.git   # explicit name
[mirror] git@gitee.com:acme/widgets.git      # bracketed name
build-2! https://ci.example.com/acme/b.git   # trailing ! opts out of grouping
";
        let (remotes, rejected) = parse_config_content(content);
        assert!(rejected.is_empty(), "{rejected:?}");

        let pairs: Vec<(&str, &str)> = remotes
            .iter()
            .map(|r| (r.name.as_str(), r.url.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("widgets", "https://github.com/acme/widgets.git"),
                ("backup", "https://gitlab.com/acme/widgets.git"),
                ("mirror", "git@gitee.com:acme/widgets.git"),
                ("build-2", "https://ci.example.com/acme/b.git"),
            ]
        );
    }

    #[test]
    fn test_extra_tokens_rejected() {
        let content = "backup https://gitlab.com/acme/widgets.git extra
";
        let (remotes, rejected) = parse_config_content(content);
        assert!(remotes.is_empty());
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].line, 1);
        assert!(rejected[0].reason.contains("3 fields"));
    }

    #[test]
    fn test_hash_inside_token_is_kept() {
        assert_eq!(strip_inline_comment("a#b c # d"), "a#b c ");
        assert_eq!(strip_inline_comment("# whole line"), "");
    }

    #[test]
    fn test_option_like_names_rejected() {
        let content = "-v https://github.com/a/b.git
[--mirror] https://gitlab.com/a/b.git
ok https://gitee.com/a/b.git
";
        let (remotes, rejected) = parse_config_content(content);

        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].name, "ok");
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].value, "-v");
        assert!(rejected[0].reason.contains("must not start with '-'"));
        assert_eq!(rejected[1].line, 2);
    }

    #[test]
    fn test_generated_option_like_name_rejected() {
        let (remotes, rejected) = parse_config_content("https://github.com/acme/-x.git
");
        assert!(remotes.is_empty());
        assert!(rejected[0].reason.contains("invalid remote name"));
    }

    #[test]
    fn test_env_option_like_name_rejected() {
        let env = env_from(&[
            ("GIT_SYNC_REMOTE_URL_0", "https://gitlab.com/a/three.git"),
            ("GIT_SYNC_REMOTE_NAME_0", "--upload-pack=touch"),
            ("GIT_SYNC_REMOTE_URL_1", "https://gitlab.com/a/four.git"),
        ]);
        let loaded = parse_env(env);

        let names: Vec<&str> = loaded.remotes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["four"]);
        assert_eq!(loaded.rejected.len(), 1);
        assert_eq!(loaded.rejected[0].value, "--upload-pack=touch");
        assert!(loaded.rejected[0].reason.starts_with("GIT_SYNC_REMOTE_URL_0"));
    }

    #[test]
    fn test_duplicate_explicit_name_rejected() {
        let content = "origin https://github.com/a/b.git\norigin https://gitlab.com/a/b.git\n";
        let (remotes, rejected) = parse_config_content(content);
        assert_eq!(remotes.len(), 1);
        assert_eq!(rejected[0].reason, "duplicate remote name");
    }

    #[test]
    fn test_env_takes_precedence_over_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".git-remotes.txt"), "https://github.com/a/file.git\n").unwrap();

        let env = env_from(&[("GIT_SYNC_REMOTES", "https://github.com/a/env.git")]);
        let loaded = load_remotes(dir.path(), env).unwrap();
        assert_eq!(loaded.source, ConfigSource::Environment);
        assert_eq!(loaded.remotes.len(), 1);
        assert_eq!(loaded.remotes[0].name, "env");

        let loaded = load_remotes(dir.path(), no_env).unwrap();
        assert_eq!(loaded.source.describe(), ".git-remotes.txt");
        assert_eq!(loaded.remotes[0].name, "file");
    }

    #[test]
    fn test_env_forms_are_concatenated() {
        let env = env_from(&[
            ("GIT_SYNC_REMOTES", "https://github.com/a/one.git, https://gitee.com/a/one.git"),
            ("GIT_SYNC_REMOTE_0", "git@host.io:a/two.git"),
            ("GIT_SYNC_REMOTE_1", "short"),
            ("GIT_SYNC_REMOTE_URL_0", "https://gitlab.com/a/three.git"),
            ("GIT_SYNC_REMOTE_NAME_0", "lab"),
            ("GIT_SYNC_REMOTE_URL_1", "https://gitlab.com/a/four.git"),
        ]);
        let loaded = parse_env(env);

        let names: Vec<&str> = loaded.remotes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "one-2", "two", "lab", "four"]);
        assert_eq!(loaded.rejected.len(), 1);
        assert!(loaded.rejected[0].reason.starts_with("GIT_SYNC_REMOTE_1"));
    }

    #[test]
    fn test_missing_config_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let err = load_remotes(dir.path(), no_env).unwrap_err();
        assert!(matches!(err, SyncError::Configuration { .. }));
        assert!(err.to_string().contains(".git-remotes.txt"));
    }

    #[test]
    fn test_config_without_valid_entries_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("git-remotes"), "无效的URL\nhttp://invalid-url\n").unwrap();
        let err = load_remotes(dir.path(), no_env).unwrap_err();
        assert!(err.to_string().contains("contains no valid remotes"));
    }

    #[test]
    fn test_sample_config_parses_and_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = write_sample_config(dir.path(), false).unwrap();
        assert!(path.ends_with(".git-remotes.txt"));

        let loaded = load_remotes(dir.path(), no_env).unwrap();
        assert_eq!(loaded.remotes.len(), 5);
        assert!(loaded.rejected.is_empty());

        assert!(write_sample_config(dir.path(), false).is_err());
        assert!(write_sample_config(dir.path(), true).is_ok());
    }

    #[test]
    fn test_disable_by_name() {
        let (remotes, _) = parse_config_content(
            "origin https://github.com/a/b.git\nbackup https://gitlab.com/a/b.git\n",
        );
        let mut loaded = LoadedRemotes {
            source: ConfigSource::Environment,
            remotes,
            rejected: Vec::new(),
        };
        loaded.disable(&["backup".to_string()]);
        assert!(loaded.remotes[0].enabled);
        assert!(!loaded.remotes[1].enabled);
    }
}
