//! Workspace-level configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// File name of the optional workspace configuration.
pub const CONFIG_FILE: &str = "monorail.toml";

/// Workspace-level configuration as defined in `monorail.toml`.
///
/// Every field is optional; accessors fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceConfig {
    /// Registry endpoint packages are published to and queried against.
    pub registry: Option<String>,
    /// Prefix for release tags (default `v`).
    pub tag_prefix: Option<String>,
    /// Fixed delay between successful publishes, in milliseconds.
    pub publish_delay_ms: Option<u64>,
    /// Attempt budget for post-publish verification polling.
    pub verify_attempts: Option<u32>,
    /// Delay between verification polls, in milliseconds.
    pub verify_delay_ms: Option<u64>,
    /// Default number of parallel jobs for build/test.
    pub default_parallel: Option<usize>,
    /// Changelog path, relative to the workspace config file.
    pub changelog: Option<String>,
    /// Path the config was loaded from (for resolving relative paths).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl WorkspaceConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: WorkspaceConfig = toml::from_str(&content).map_err(|error| Error::Toml {
            error,
            context: path.display().to_string(),
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Walks up from the packages directory looking for `monorail.toml`,
    /// stopping at the repository root (`.git`).
    pub fn discover(packages_dir: &Path) -> Result<Self> {
        let mut current_dir = match packages_dir.parent() {
            Some(parent) => parent,
            None => return Ok(Self::default()),
        };

        loop {
            let config_file = current_dir.join(CONFIG_FILE);
            if config_file.exists() {
                return Self::load(&config_file);
            }

            if current_dir.join(".git").exists() {
                break;
            }

            match current_dir.parent() {
                Some(parent) => {
                    if parent == current_dir {
                        break;
                    }
                    current_dir = parent;
                }
                None => break,
            }
        }

        Ok(Self::default())
    }

    #[inline]
    pub fn tag_prefix(&self) -> &str {
        self.tag_prefix.as_deref().unwrap_or("v")
    }

    #[inline]
    pub fn publish_delay(&self) -> Duration {
        Duration::from_millis(self.publish_delay_ms.unwrap_or(2000))
    }

    #[inline]
    pub fn verify_attempts(&self) -> u32 {
        self.verify_attempts.unwrap_or(10)
    }

    #[inline]
    pub fn verify_delay(&self) -> Duration {
        Duration::from_millis(self.verify_delay_ms.unwrap_or(3000))
    }

    /// Changelog path resolved against the config file's directory, or
    /// `CHANGELOG.md` next to the packages dir when no config exists.
    pub fn changelog_path(&self, packages_dir: &Path) -> PathBuf {
        let file = self.changelog.as_deref().unwrap_or("CHANGELOG.md");
        let base = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| packages_dir.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| packages_dir.to_path_buf());
        base.join(file)
    }
}
