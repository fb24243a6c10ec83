//! Integration tests for the git-sync CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn git_sync(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("git-sync").unwrap();
    cmd.current_dir(dir)
        .env_remove("GIT_SYNC_REMOTES")
        .env_remove("GIT_SYNC_REMOTE_0")
        .env_remove("GIT_SYNC_REMOTE_URL_0");
    cmd
}

fn has_git() -> bool {
    which::which("git").is_ok()
}

/// Run git in `dir`, panicking on failure
fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A working copy on `main` with one commit, plus bare repos by name
fn workspace(bare: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let work = temp.path().join("work");
    fs::create_dir(&work).unwrap();

    git(&work, &["init", "-q"]);
    git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&work, &["config", "user.name", "git-sync tests"]);
    git(&work, &["config", "user.email", "tests@example.com"]);
    git(&work, &["config", "commit.gpgsign", "false"]);
    fs::write(work.join("README.md"), "hello\n").unwrap();
    git(&work, &["add", "README.md"]);
    git(&work, &["commit", "-q", "-m", "initial"]);

    for name in bare {
        git(temp.path(), &["init", "-q", "--bare", &format!("{name}.git")]);
    }
    temp
}

/// Route an https URL to a local bare repository
fn redirect(work: &Path, url: &str, bare: &Path) {
    let key = format!("url.{}.insteadOf", bare.display());
    git(work, &["config", "--add", &key, url]);
}

#[test]
fn test_cli_help() {
    let temp = TempDir::new().unwrap();
    git_sync(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync-all"))
        .stdout(predicate::str::contains("push"));
}

#[test]
fn test_cli_version() {
    let temp = TempDir::new().unwrap();
    git_sync(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-sync"));
}

#[test]
fn test_invalid_subcommand() {
    let temp = TempDir::new().unwrap();
    git_sync(temp.path())
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_policy_rejected() {
    let temp = TempDir::new().unwrap();
    git_sync(temp.path())
        .args(["push", "--on-non-ff", "merge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_init_writes_sample_and_refuses_overwrite() {
    let temp = TempDir::new().unwrap();

    git_sync(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains(".git-remotes.txt"));
    assert!(temp.path().join(".git-remotes.txt").is_file());

    git_sync(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    git_sync(temp.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn test_config_lists_remotes_and_groups() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".git-remotes.txt"),
        "# remotes\nhttps://github.com/acme/widgets.git\nwidgets-2 https://gitlab.com/acme/widgets.git\n[backup] git@gitee.com:acme/widgets.git\nnot-a-url\n",
    )
    .unwrap();

    git_sync(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(".git-remotes.txt"))
        .stdout(predicate::str::contains("widgets-2"))
        .stdout(predicate::str::contains("backup"))
        .stdout(predicate::str::contains("Skipping line 5"));
}

#[test]
fn test_config_json_output() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("git-remotes.txt"),
        "origin https://github.com/acme/widgets.git\n",
    )
    .unwrap();

    let output = git_sync(temp.path())
        .args(["--format", "json", "config"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["remotes"][0]["name"], "origin");
    assert_eq!(value["source"]["kind"], "file");
}

#[test]
fn test_remotes_from_environment_take_precedence() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".git-remotes.txt"),
        "origin https://github.com/acme/widgets.git\n",
    )
    .unwrap();

    git_sync(temp.path())
        .env("GIT_SYNC_REMOTES", "https://gitlab.com/acme/gadgets.git")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("environment variables"))
        .stdout(predicate::str::contains("gadgets"))
        .stdout(predicate::str::contains("github.com").not());
}

#[test]
fn test_push_without_configuration_fails() {
    let temp = TempDir::new().unwrap();
    git_sync(temp.path())
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No remote configuration found"))
        .stderr(predicate::str::contains(".git-remotes.txt"));
}

#[test]
fn test_disabled_remotes_leave_empty_registry() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".git-remotes.txt"),
        "origin https://github.com/acme/widgets.git\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("git-sync.toml"),
        "[registry]\ndisabled = [\"origin\"]\n",
    )
    .unwrap();

    git_sync(temp.path())
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no enabled remotes"));
}

#[test]
fn test_push_on_detached_head_fails() {
    if !has_git() {
        return;
    }
    let temp = workspace(&[]);
    let work = temp.path().join("work");
    fs::write(
        work.join(".git-remotes.txt"),
        "origin https://example.com/acme/widgets.git\n",
    )
    .unwrap();
    git(&work, &["checkout", "-q", "--detach"]);

    git_sync(&work)
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("detached HEAD"));
}

#[test]
fn test_push_to_every_remote() {
    if !has_git() {
        return;
    }
    let temp = workspace(&["a", "b"]);
    let work = temp.path().join("work");
    redirect(&work, "https://example.com/acme/widgets.git", &temp.path().join("a.git"));
    redirect(&work, "https://example.com/acme/widgets-b.git", &temp.path().join("b.git"));
    fs::write(
        work.join(".git-remotes.txt"),
        "origin https://example.com/acme/widgets.git\nbackup https://example.com/acme/widgets-b.git\n",
    )
    .unwrap();

    git_sync(&work).arg("push").assert().success();

    let head = git(&work, &["rev-parse", "HEAD"]);
    for bare in ["a.git", "b.git"] {
        let pushed = git(&temp.path().join(bare), &["rev-parse", "refs/heads/main"]);
        assert_eq!(pushed, head);
    }
}

#[test]
fn test_failing_remote_does_not_stop_the_others() {
    if !has_git() {
        return;
    }
    let temp = workspace(&["a", "b"]);
    let work = temp.path().join("work");
    redirect(&work, "https://example.com/acme/widgets.git", &temp.path().join("a.git"));
    redirect(&work, "https://example.com/acme/widgets-b.git", &temp.path().join("b.git"));
    redirect(
        &work,
        "https://example.com/acme/missing.git",
        &temp.path().join("missing.git"),
    );
    fs::write(
        work.join(".git-remotes.txt"),
        "missing https://example.com/acme/missing.git\norigin https://example.com/acme/widgets.git\nbackup https://example.com/acme/widgets-b.git\n",
    )
    .unwrap();

    let output = git_sync(&work)
        .args(["--format", "json", "push"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 3 remotes failed"));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["attempted"], 3);
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["outcomes"][0]["success"], false);
    assert_eq!(report["outcomes"][0]["strategy"], "set-upstream-retry");

    for bare in ["a.git", "b.git"] {
        git(&temp.path().join(bare), &["rev-parse", "refs/heads/main"]);
    }
}

#[test]
fn test_commit_twice_reports_no_changes() {
    if !has_git() {
        return;
    }
    let temp = workspace(&[]);
    let work = temp.path().join("work");
    fs::write(
        work.join(".git-remotes.txt"),
        "origin https://example.com/acme/widgets.git\n",
    )
    .unwrap();
    fs::write(work.join("notes.txt"), "change\n").unwrap();

    git_sync(&work)
        .args(["commit", "add notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Committed"));
    let commits = git(&work, &["rev-list", "--count", "HEAD"]);

    git_sync(&work)
        .args(["commit", "add notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes to commit"));
    assert_eq!(git(&work, &["rev-list", "--count", "HEAD"]), commits);
}

#[test]
fn test_sync_all_replicates_branches_and_tags() {
    if !has_git() {
        return;
    }
    let temp = workspace(&["source", "copy"]);
    let work = temp.path().join("work");
    let source = temp.path().join("source.git");

    git(&work, &["branch", "feature"]);
    git(&work, &["tag", "v1.0.0"]);
    git(&work, &["remote", "add", "origin", &source.display().to_string()]);
    git(&work, &["push", "-q", "origin", "main", "feature", "--tags"]);

    let copy = temp.path().join("copy.git");
    let output = git_sync(&work)
        .args(["--format", "json", "sync-all", &copy.display().to_string()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["branches"], 2);
    assert_eq!(report["tags"], 1);
    assert_eq!(report["success"], true);

    git(&copy, &["rev-parse", "refs/heads/main"]);
    git(&copy, &["rev-parse", "refs/heads/feature"]);
    git(&copy, &["rev-parse", "refs/tags/v1.0.0"]);
}

#[test]
fn test_sync_all_unknown_source_fails() {
    if !has_git() {
        return;
    }
    let temp = workspace(&[]);
    let work = temp.path().join("work");

    git_sync(&work)
        .args(["sync-all", "https://example.com/acme/copy.git", "--source", "upstream"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'upstream' does not exist"));
}
