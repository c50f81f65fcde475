//! Typed view over a package's `package.json` manifest.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the per-package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Typed view over one package's declared identity, version, scripts,
/// and dependency ranges.
///
/// Dependency maps are `IndexMap`s so declaration order survives a
/// load/store round-trip and drives deterministic graph traversal.
/// Fields this tool does not interpret are captured in `extra` and
/// written back untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub private: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scripts: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, String>,
    #[serde(
        default,
        rename = "devDependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(
        default,
        rename = "peerDependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub peer_dependencies: IndexMap<String, String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Manifest {
    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|error| Error::Json {
            error,
            path: path.to_path_buf(),
        })
    }

    /// Writes the manifest back as pretty-printed JSON with a trailing
    /// newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self).map_err(Error::JsonSerialize)?;
        content.push('\n');
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Returns the command for a named script, if declared.
    #[inline]
    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }

    #[inline]
    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Returns the union of the three dependency maps' keys in
    /// declaration order, deduplicated.
    pub fn dependency_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(
            self.dependencies.len() + self.dev_dependencies.len() + self.peer_dependencies.len(),
        );
        for name in self
            .dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .chain(self.peer_dependencies.keys())
        {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
        names
    }

    /// Returns the declared range for a dependency, checking
    /// `dependencies`, then `devDependencies`, then `peerDependencies`.
    pub fn dependency_range(&self, name: &str) -> Option<&str> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
            .or_else(|| self.peer_dependencies.get(name))
            .map(String::as_str)
    }
}
