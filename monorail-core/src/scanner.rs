//! Repository scanner for discovering packages.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::package::Package;

/// Scans a directory for packages.
///
/// Looks for `package.json` files up to two levels below the packages
/// directory and parses them into `Package` structures.
pub struct Scanner {
    packages_dir: PathBuf,
}

impl Scanner {
    pub fn new(packages_dir: impl AsRef<Path>) -> Self {
        Self {
            packages_dir: packages_dir.as_ref().to_path_buf(),
        }
    }

    /// Discovers all packages under the packages directory.
    ///
    /// Results are sorted by package name. `node_modules` trees are
    /// never descended into.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest cannot be read or parsed, or if
    /// two manifests declare the same package name.
    pub fn scan(&self) -> Result<Vec<Package>> {
        let manifest_files: Vec<PathBuf> = WalkDir::new(&self.packages_dir)
            .max_depth(2)
            .into_iter()
            .filter_entry(|e| e.file_name() != "node_modules")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() == MANIFEST_FILE)
            .map(|e| e.path().to_path_buf())
            .collect();

        let packages: Result<Vec<Package>> = manifest_files
            .into_par_iter()
            .map(|manifest_path| {
                let package_dir = manifest_path
                    .parent()
                    .ok_or_else(|| Error::Io(std::io::Error::other("manifest has no parent directory")))?;

                let manifest = Manifest::load(&manifest_path)?;
                let relative_path = package_dir
                    .strip_prefix(&self.packages_dir)
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|_| package_dir.to_path_buf());

                Ok(Package::new(relative_path, manifest_path.clone(), manifest))
            })
            .collect();

        let mut packages = packages?;
        packages.sort_by(|a, b| a.name.cmp(&b.name));

        for pair in packages.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(Error::DuplicatePackage {
                    name: pair[0].name.clone(),
                    first: pair[0].manifest_path.clone(),
                    second: pair[1].manifest_path.clone(),
                });
            }
        }

        Ok(packages)
    }
}
