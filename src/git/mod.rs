//! Git gateway for git-sync
//!
//! Every interaction with the version-control tool goes through the [`Vcs`]
//! trait: one git subcommand per call, a structured result back, and a
//! non-zero exit reported as `success: false` rather than an error. The
//! higher-level operations in [`operations`] and [`remote`] are blanket
//! extensions over any `Vcs`, so the engine can be driven by the real
//! [`GitCommand`] or by a scripted double in tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use console::style;

use crate::error::{Result, SyncError};

pub mod operations;
pub mod remote;

#[cfg(test)]
pub(crate) mod scripted;

pub use operations::{GitOperations, PushFlags};
pub use remote::{RemoteOperations, RemoteSetup};

/// Per-call options for [`Vcs::execute`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOptions {
    /// Suppress echoing the command line
    pub silent: bool,
}

impl ExecOptions {
    pub const SILENT: ExecOptions = ExecOptions { silent: true };
    pub const ECHO: ExecOptions = ExecOptions { silent: false };
}

/// Outcome of a single git invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub success: bool,
    /// Trimmed standard output
    pub output: String,
    /// Trimmed standard error (or a placeholder when git printed nothing)
    pub error: String,
    /// The command line as it would be typed, for diagnostics
    pub command: String,
}

impl ExecResult {
    pub fn ok(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: String::new(),
            command: command.into(),
        }
    }

    pub fn failed(command: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: error.into(),
            command: command.into(),
        }
    }

    /// Turn a failed result into a fatal [`SyncError::VcsOperation`]
    pub fn into_result(self) -> Result<ExecResult> {
        if self.success {
            Ok(self)
        } else {
            Err(SyncError::VcsOperation {
                command: self.command,
                stderr: self.error,
            })
        }
    }
}

/// Capability contract for running version-control operations
pub trait Vcs {
    /// Run `git <operation> <args...>`; must not fail on a non-zero exit
    fn execute(&self, operation: &str, args: &[&str], options: ExecOptions) -> ExecResult;
}

impl<T: Vcs + ?Sized> Vcs for &T {
    fn execute(&self, operation: &str, args: &[&str], options: ExecOptions) -> ExecResult {
        (**self).execute(operation, args, options)
    }
}

/// Render an argv the way a user would type it
pub(crate) fn command_line(binary: &str, operation: &str, args: &[&str]) -> String {
    let mut line = format!("{binary} {operation}");
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// [`Vcs`] backed by the installed git binary
///
/// Arguments are handed to the process as a vector; nothing is ever passed
/// through a shell, so remote names, URLs and commit messages are inert.
#[derive(Debug, Clone)]
pub struct GitCommand {
    binary: PathBuf,
    display_name: String,
    work_dir: PathBuf,
    echo: bool,
}

impl GitCommand {
    /// Locate `binary` on PATH and bind it to `work_dir`
    pub fn new(binary: &str, work_dir: impl AsRef<Path>) -> Result<Self> {
        let resolved =
            which::which(binary).map_err(|_| SyncError::GitUnavailable(binary.to_string()))?;

        Ok(Self {
            binary: resolved,
            display_name: binary.to_string(),
            work_dir: work_dir.as_ref().to_path_buf(),
            echo: true,
        })
    }

    /// Enable or disable echoing of non-silent command lines
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

impl Vcs for GitCommand {
    fn execute(&self, operation: &str, args: &[&str], options: ExecOptions) -> ExecResult {
        let command = command_line(&self.display_name, operation, args);

        if !options.silent && self.echo {
            println!("{}", style(format!("$ {command}")).blue());
        }
        tracing::debug!("exec: {}", command);

        let output = match Command::new(&self.binary)
            .arg(operation)
            .args(args)
            .current_dir(&self.work_dir)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("failed to spawn {}: {}", command, e);
                return ExecResult::failed(command, e.to_string());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if output.status.success() {
            ExecResult::ok(command, stdout)
        } else {
            tracing::debug!("exit {:?}: {}", output.status.code(), stderr);
            // Some failures (e.g. `diff --quiet`) only speak through stdout
            let error = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                "Unknown error".to_string()
            };
            ExecResult {
                success: false,
                output: String::new(),
                error,
                command,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_rendering() {
        assert_eq!(
            command_line("git", "push", &["--force-with-lease", "https://h/a/b.git", "main"]),
            "git push --force-with-lease https://h/a/b.git main"
        );
        assert_eq!(command_line("git", "status", &[]), "git status");
    }

    #[test]
    fn test_failed_result_escalates() {
        let err = ExecResult::failed("git fetch origin --tags", "could not read")
            .into_result()
            .unwrap_err();
        assert!(matches!(err, SyncError::VcsOperation { .. }));
        assert!(err.to_string().contains("git fetch origin --tags"));
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let err = GitCommand::new("definitely-not-a-git-binary-xyz", ".").unwrap_err();
        assert!(matches!(err, SyncError::GitUnavailable(_)));
    }
}
