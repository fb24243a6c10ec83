use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sync::NonFastForwardPolicy;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const ENV_PREFIX: &str = "GIT_SYNC_";

/// Tool settings: defaults for command flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub git: GitSettings,
    pub push: PushSettings,
    pub pull: PullSettings,
    pub replicate: ReplicateSettings,
    pub registry: RegistrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    pub binary: String,
    pub echo_commands: bool,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            echo_commands: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    pub on_non_ff: NonFastForwardPolicy,
    pub pull_before_push: bool,
    pub set_upstream: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullSettings {
    pub rebase: bool,
    pub merge_mirrors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicateSettings {
    pub source: String,
}

impl Default for ReplicateSettings {
    fn default() -> Self {
        Self {
            source: "origin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Remote names excluded from every run
    pub disabled: Vec<String>,
}

impl Settings {
    /// Layer defaults, user config, repository config, an explicit file and
    /// `GIT_SYNC_*` environment variables (highest priority)
    pub fn load(project_dir: &Path, custom_config: Option<&Path>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(user_base) = Self::user_config_base_path() {
            figment = Self::merge_any_format(figment, &user_base);
        }
        figment = Self::merge_any_format(figment, &project_dir.join("git-sync"));

        if let Some(path) = custom_config {
            tracing::trace!("CONFIG LOAD: Custom file {}", path.display());
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        // GIT_SYNC_REMOTE* variables belong to the remote list, not settings
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .filter(|key| !key.as_str().to_ascii_lowercase().starts_with("remote"))
                .split("__"),
        );

        let settings: Settings = figment.extract()?;
        tracing::trace!("CONFIG LOAD: on_non_ff = {}", settings.push.on_non_ff);
        Ok(settings)
    }

    fn merge_any_format(figment: Figment, base: &Path) -> Figment {
        let with_ext = |ext: &str| base.with_extension(ext);
        figment
            .merge(Toml::file(with_ext("toml")))
            .merge(Json::file(with_ext("json")))
            .merge(Yaml::file(with_ext("yaml")))
            .merge(Yaml::file(with_ext("yml")))
    }

    fn user_config_base_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("git-sync")
                .join("config")
        })
    }
}
