//! # git-sync - one working copy, many remotes
//!
//! Keeps a local repository mirrored to several independent hosts. Remotes
//! are listed in `.git-remotes.txt` (or `GIT_SYNC_REMOTE*` variables); pushes
//! go to every remote independently, pulls come from the primary remote and
//! mirrors are fetched.
//!
//! ## Quick Start
//!
//! ```bash
//! git-sync init        # write a sample .git-remotes.txt
//! git-sync setup       # create the git remotes
//! git-sync push        # push the current branch everywhere
//! git-sync sync-all https://git.example.com/team/copy.git
//! ```
//!
//! Names ending in `-<digits>` (`origin-2`) are extra push URLs of the
//! remote without the suffix; see [`remote`].

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod remote;
pub mod sync;

pub use cli::{Cli, Output};
pub use config::Settings;
pub use error::{Result, SyncError};
pub use remote::{RemoteGroup, RemoteRegistry, RemoteTarget};
pub use sync::{NonFastForwardPolicy, Replicator, RunReport, SyncEngine};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
