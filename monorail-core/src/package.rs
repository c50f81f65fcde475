//! Package data model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;

/// A package discovered in the monorepo.
///
/// Created at discovery time from its manifest; mutated only by the
/// version bump and dependency sync operations, never removed during a
/// single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Directory containing the manifest, relative to the packages dir.
    pub path: PathBuf,
    /// Absolute path of the manifest file.
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
}

impl Package {
    pub fn new(path: PathBuf, manifest_path: PathBuf, manifest: Manifest) -> Self {
        Self {
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            path,
            manifest_path,
            manifest,
        }
    }

    #[inline]
    pub fn has_script(&self, name: &str) -> bool {
        self.manifest.has_script(name)
    }

    #[inline]
    pub fn private(&self) -> bool {
        self.manifest.private
    }
}
