//! Publish orchestration: idempotent registry publishing in dependency
//! order, post-publish verification, and rollback.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::package::Package;
use crate::registry::{Registry, VcsTagger};
use crate::runner::CommandRunner;

/// Terminal state of one package within a publish run.
#[derive(Debug, Clone)]
pub enum PublishStatus {
    Published { duration: Duration },
    Skipped { reason: String },
    DryRun,
    Failed { message: String },
}

/// Per-package, per-run publish outcome.
#[derive(Debug, Clone)]
pub struct PublishRecord {
    pub package: String,
    pub version: String,
    pub status: PublishStatus,
}

impl PublishRecord {
    #[inline]
    pub fn failed(&self) -> bool {
        matches!(self.status, PublishStatus::Failed { .. })
    }
}

/// Knobs for one publish run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Report intended actions without touching the registry.
    pub dry_run: bool,
    /// Publish even when the version exists; continue past failures.
    pub force: bool,
    /// Skip the pre-publish registry existence check.
    pub skip_version_check: bool,
    /// Fixed delay between successful publishes.
    pub delay: Duration,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            force: false,
            skip_version_check: false,
            delay: Duration::from_millis(2000),
        }
    }
}

/// Outcome of verification polling for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    /// The attempt budget ran out. Reported, never raised; the caller
    /// decides whether it is fatal.
    Timeout,
}

#[derive(Debug, Clone)]
pub struct VerifyRecord {
    pub package: String,
    pub version: String,
    pub outcome: VerifyOutcome,
}

/// Outcome of rolling back one package's published version.
#[derive(Debug, Clone)]
pub enum RollbackOutcome {
    Success,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RollbackRecord {
    pub package: String,
    pub outcome: RollbackOutcome,
}

#[derive(Debug, Clone)]
pub struct RollbackReport {
    pub tag: String,
    /// Both the local and remote tag were removed.
    pub tag_removed: bool,
    pub tag_errors: Vec<String>,
    pub packages: Vec<RollbackRecord>,
}

/// Walks the topological order publishing packages one at a time.
///
/// Per package: `pending -> (version exists -> skipped) -> building ->
/// packaging-verified -> publishing -> published | failed`. Publishing
/// is strictly serialized because the publish order itself encodes the
/// dependency guarantee registry consumers rely on.
pub struct PublishOrchestrator {
    packages_dir: PathBuf,
    graph: DependencyGraph,
    runner: Arc<dyn CommandRunner>,
    registry: Arc<dyn Registry>,
    options: PublishOptions,
}

impl PublishOrchestrator {
    pub fn new(
        packages_dir: impl Into<PathBuf>,
        graph: DependencyGraph,
        runner: Arc<dyn CommandRunner>,
        registry: Arc<dyn Registry>,
        options: PublishOptions,
    ) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            graph,
            runner,
            registry,
            options,
        }
    }

    /// Publishes every package in topological order.
    ///
    /// Re-running a completed release is a no-op: each package whose
    /// version is already on the registry is marked skipped. On a
    /// failure the run aborts without attempting subsequent packages,
    /// unless forcing, which continues best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error only for structural problems (a cycle); package
    /// failures are recorded in the returned records.
    pub fn publish_all(&self) -> Result<Vec<PublishRecord>> {
        let order = self.graph.topological_order()?;
        let mut records = Vec::with_capacity(order.len());

        for (idx, name) in order.iter().enumerate() {
            let package = self.graph.package(name)?;
            let status = self.publish_one(package);

            let failed = matches!(status, PublishStatus::Failed { .. });
            let published = matches!(status, PublishStatus::Published { .. });
            records.push(PublishRecord {
                package: package.name.clone(),
                version: package.version.clone(),
                status,
            });

            if failed && !self.options.force {
                break;
            }
            if published && idx + 1 < order.len() && !self.options.delay.is_zero() {
                thread::sleep(self.options.delay);
            }
        }

        Ok(records)
    }

    fn publish_one(&self, package: &Package) -> PublishStatus {
        if package.private() {
            return PublishStatus::Skipped {
                reason: "private package".to_string(),
            };
        }

        if !self.options.skip_version_check && !self.options.force {
            match self.registry.exists(&package.name, &package.version) {
                Ok(true) => {
                    debug!(package = %package.name, version = %package.version, "already on registry");
                    return PublishStatus::Skipped {
                        reason: "version already exists".to_string(),
                    };
                }
                Ok(false) => {}
                Err(e) => {
                    return PublishStatus::Failed {
                        message: e.to_string(),
                    }
                }
            }
        }

        if self.options.dry_run {
            return PublishStatus::DryRun;
        }

        let package_dir = self.packages_dir.join(&package.path);
        let start = Instant::now();

        if let Some(command) = package.manifest.script("build") {
            match self.runner.run(&package_dir, command) {
                Ok(output) if output.success() => {}
                Ok(output) => {
                    return PublishStatus::Failed {
                        message: format!("build script failed with exit code {}", output.exit_code),
                    }
                }
                Err(e) => {
                    return PublishStatus::Failed {
                        message: e.to_string(),
                    }
                }
            }
        }

        if let Err(e) = self.registry.pack_check(&package_dir) {
            return PublishStatus::Failed {
                message: e.to_string(),
            };
        }

        match self.registry.publish(&package_dir) {
            Ok(()) => {
                info!(package = %package.name, version = %package.version, "published");
                PublishStatus::Published {
                    duration: start.elapsed(),
                }
            }
            Err(e) => PublishStatus::Failed {
                message: e.to_string(),
            },
        }
    }

    /// Polls the registry until every package shows `version`, or the
    /// attempt budget runs out for it.
    ///
    /// Packages are polled in topological order, matching publish
    /// order. Private packages are never published and are not polled.
    ///
    /// # Errors
    ///
    /// Returns an error only for structural problems (a cycle); a
    /// package that never propagates is reported as `Timeout`.
    pub fn verify_release(
        &self,
        version: &str,
        attempts: u32,
        delay: Duration,
    ) -> Result<Vec<VerifyRecord>> {
        let order = self.graph.topological_order()?;
        let mut records = Vec::with_capacity(order.len());

        for name in &order {
            let package = self.graph.package(name)?;
            if package.private() {
                continue;
            }

            let mut outcome = VerifyOutcome::Timeout;
            for attempt in 0..attempts {
                if attempt > 0 && !delay.is_zero() {
                    thread::sleep(delay);
                }
                if let Ok(true) = self.registry.exists(&package.name, version) {
                    outcome = VerifyOutcome::Verified;
                    break;
                }
            }

            records.push(VerifyRecord {
                package: package.name.clone(),
                version: version.to_string(),
                outcome,
            });
        }

        Ok(records)
    }

    /// Reverses a release: removes the release tag locally and on the
    /// remote, and optionally unpublishes `name@version` for every
    /// package currently showing that version on the registry.
    ///
    /// The caller must have asserted an explicit force flag. Packages
    /// are walked in reverse topological order so dependents disappear
    /// before their dependencies; one package's failure never stops the
    /// attempts on the others.
    ///
    /// # Errors
    ///
    /// Returns an error only for structural problems (a cycle).
    pub fn rollback(
        &self,
        tag: &str,
        version: &str,
        unpublish: bool,
        tagger: &dyn VcsTagger,
    ) -> Result<RollbackReport> {
        let mut report = RollbackReport {
            tag: tag.to_string(),
            tag_removed: false,
            tag_errors: Vec::new(),
            packages: Vec::new(),
        };

        if let Err(e) = tagger.remove_tag(tag) {
            report.tag_errors.push(e.to_string());
        }
        if let Err(e) = tagger.remove_remote_tag(tag) {
            report.tag_errors.push(e.to_string());
        }
        report.tag_removed = report.tag_errors.is_empty();

        if unpublish {
            let mut order = self.graph.topological_order()?;
            order.reverse();

            for name in order {
                let package = self.graph.package(&name)?;
                if package.private() {
                    continue;
                }

                let outcome = match self.registry.exists(&package.name, version) {
                    Ok(false) => RollbackOutcome::NotFound,
                    Ok(true) => match self.registry.unpublish(&package.name, version) {
                        Ok(()) => RollbackOutcome::Success,
                        Err(e) => RollbackOutcome::Failed(e.to_string()),
                    },
                    Err(e) => RollbackOutcome::Failed(e.to_string()),
                };

                report.packages.push(RollbackRecord {
                    package: name,
                    outcome,
                });
            }
        }

        Ok(report)
    }

    #[inline]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}
