//! External dependency version drift detection and resolution.

use std::collections::HashSet;

use indexmap::IndexMap;
use semver::Version;
use tracing::debug;

use crate::error::Result;
use crate::package::Package;

/// An external dependency declared with more than one version range.
#[derive(Debug, Clone)]
pub struct VersionConflict {
    /// External dependency name.
    pub name: String,
    /// Range string to the packages declaring it, in observation order.
    pub usages: IndexMap<String, Vec<String>>,
    /// Canonical range all packages should converge on.
    pub suggested: String,
    /// False when the lexicographic fallback decided the suggestion.
    pub confident: bool,
}

/// A single range rewrite applied by `ConflictResolver::apply`.
#[derive(Debug, Clone)]
pub struct SyncChange {
    pub package: String,
    pub dependency: String,
    pub from: String,
    pub to: String,
}

/// Scans external dependency usage across packages and converges
/// divergent ranges onto a canonical one.
///
/// Only `dependencies` and `devDependencies` participate;
/// `peerDependencies` are read-only inputs and never auto-synced.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Finds every external dependency used with two or more distinct
    /// version ranges.
    pub fn detect(packages: &[Package]) -> Vec<VersionConflict> {
        let internal: HashSet<&str> = packages.iter().map(|p| p.name.as_str()).collect();

        let mut usage: IndexMap<String, IndexMap<String, Vec<String>>> = IndexMap::new();
        for package in packages {
            let maps = [
                &package.manifest.dependencies,
                &package.manifest.dev_dependencies,
            ];
            for map in maps {
                for (dep_name, range) in map {
                    if internal.contains(dep_name.as_str()) {
                        continue;
                    }
                    let owners = usage
                        .entry(dep_name.clone())
                        .or_default()
                        .entry(range.clone())
                        .or_default();
                    if !owners.contains(&package.name) {
                        owners.push(package.name.clone());
                    }
                }
            }
        }

        usage
            .into_iter()
            .filter(|(_, ranges)| ranges.len() > 1)
            .map(|(name, usages)| {
                let ranges: Vec<&str> = usages.keys().map(String::as_str).collect();
                let (suggested, confident) = suggest_range(&ranges);
                VersionConflict {
                    name,
                    usages,
                    suggested,
                    confident,
                }
            })
            .collect()
    }

    /// Rewrites every divergent range to the suggested canonical one,
    /// in place in each owning manifest.
    ///
    /// Purely corrective: never deletes a dependency. Applying twice in
    /// a row is a no-op the second time.
    ///
    /// # Errors
    ///
    /// Returns an error if a rewritten manifest cannot be stored.
    pub fn apply(
        packages: &mut [Package],
        conflicts: &[VersionConflict],
        dry_run: bool,
    ) -> Result<Vec<SyncChange>> {
        let mut changes = Vec::new();

        for package in packages.iter_mut() {
            let mut touched = false;
            for conflict in conflicts {
                for map in [
                    &mut package.manifest.dependencies,
                    &mut package.manifest.dev_dependencies,
                ] {
                    if let Some(range) = map.get_mut(&conflict.name) {
                        if *range != conflict.suggested {
                            changes.push(SyncChange {
                                package: package.name.clone(),
                                dependency: conflict.name.clone(),
                                from: range.clone(),
                                to: conflict.suggested.clone(),
                            });
                            *range = conflict.suggested.clone();
                            touched = true;
                        }
                    }
                }
            }

            if touched && !dry_run {
                debug!(package = %package.name, "rewriting manifest after dependency sync");
                package.manifest.store(&package.manifest_path)?;
            }
        }

        Ok(changes)
    }
}

/// Picks the canonical range: the greatest under semantic-version
/// precedence, or the lexicographic maximum when any range does not
/// parse as semver (low-confidence fallback).
fn suggest_range(ranges: &[&str]) -> (String, bool) {
    let mut best: Option<(&str, Version)> = None;
    for &range in ranges {
        match range_version(range) {
            Some(version) => {
                let replace = match &best {
                    Some((_, current)) => version > *current,
                    None => true,
                };
                if replace {
                    best = Some((range, version));
                }
            }
            None => return (lexicographic_max(ranges).to_string(), false),
        }
    }

    match best {
        Some((range, _)) => (range.to_string(), true),
        None => (lexicographic_max(ranges).to_string(), false),
    }
}

/// Parses the version carried by a range, tolerating a leading range
/// operator (`^`, `~`, `=`, `>=`, `>`).
fn range_version(range: &str) -> Option<Version> {
    let bare = range.trim().trim_start_matches(['^', '~', '>', '=']).trim();
    Version::parse(bare).ok()
}

/// Best-effort fallback for ranges that are not valid semver. Isolated
/// so a stricter policy can replace it without touching the resolver's
/// control flow.
fn lexicographic_max<'a>(ranges: &[&'a str]) -> &'a str {
    ranges.iter().copied().max().unwrap_or_default()
}
