//! Version bumping across the monorepo.

use std::collections::HashSet;

use semver::Version;
use tracing::debug;

use crate::error::{Error, Result};
use crate::package::Package;

/// A package's version change within one bump operation.
#[derive(Debug, Clone)]
pub struct VersionBump {
    pub package: String,
    pub old_version: String,
    pub new_version: String,
}

/// Bumps every package to a single release version and keeps internal
/// dependency ranges tracking it.
pub struct ReleaseEngine {
    dry_run: bool,
}

impl ReleaseEngine {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Sets every package's version to `new_version` and rewrites every
    /// internal dependency range (in all three dependency maps) to
    /// `^<new_version>`, so internal ranges always track the
    /// monorepo's released version.
    ///
    /// Manifests are written back unless dry-run.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_version` is not valid semver or a
    /// manifest cannot be stored.
    pub fn bump_all(&self, packages: &mut [Package], new_version: &str) -> Result<Vec<VersionBump>> {
        Version::parse(new_version).map_err(|source| Error::InvalidVersion {
            version: new_version.to_string(),
            source,
        })?;

        let internal: HashSet<String> = packages.iter().map(|p| p.name.clone()).collect();
        let caret_range = format!("^{}", new_version);
        let mut bumps = Vec::with_capacity(packages.len());

        for package in packages.iter_mut() {
            let old_version = package.version.clone();
            package.version = new_version.to_string();
            package.manifest.version = new_version.to_string();

            for map in [
                &mut package.manifest.dependencies,
                &mut package.manifest.dev_dependencies,
                &mut package.manifest.peer_dependencies,
            ] {
                for (dep_name, range) in map.iter_mut() {
                    if internal.contains(dep_name) {
                        *range = caret_range.clone();
                    }
                }
            }

            if !self.dry_run {
                debug!(package = %package.name, version = new_version, "writing bumped manifest");
                package.manifest.store(&package.manifest_path)?;
            }

            bumps.push(VersionBump {
                package: package.name.clone(),
                old_version,
                new_version: new_version.to_string(),
            });
        }

        Ok(bumps)
    }
}
