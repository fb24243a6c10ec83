//! Configuration management for git-sync
//!
//! Two separate inputs are handled here:
//!
//! - the **remote list** ([`remotes`]): which URLs to mirror to, read from
//!   `GIT_SYNC_REMOTE*` environment variables or a `.git-remotes.txt` style
//!   file, with URL and name validation in [`validation`];
//! - the **tool settings** ([`settings`]): defaults for command flags,
//!   layered with figment from an embedded `default-config.toml`, user and
//!   repository config files and `GIT_SYNC_*` environment variables.
//!
//! Both are loaded once per invocation and passed down explicitly.

pub mod remotes;
pub mod settings;
pub mod validation;

pub use remotes::{
    CONFIG_FILE_NAMES, ConfigSource, LoadedRemotes, RejectedEntry, generate_remote_name,
    load_remotes, load_remotes_from_process, write_sample_config,
};
pub use settings::Settings;
pub use validation::{NameRejection, UrlRejection, validate_git_url, validate_remote_name};
