//! Build/test orchestration across the dependency graph.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel;
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::package::Package;
use crate::runner::CommandRunner;

/// Outcome of running a script for one package.
#[derive(Debug, Clone)]
pub enum TaskStatus {
    Success { duration: Duration },
    /// No matching script declared; vacuous success.
    SkippedNoScript,
    /// An internal dependency (direct or transitive) failed, so this
    /// package was never launched.
    Blocked { failed_dependency: String },
    Failed { message: String },
}

/// Per-package result of one orchestrated run.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub package: String,
    pub script: String,
    pub status: TaskStatus,
    pub stdout: String,
    pub stderr: String,
}

impl TaskReport {
    /// Whether this report counts toward overall success.
    #[inline]
    pub fn ok(&self) -> bool {
        matches!(
            self.status,
            TaskStatus::Success { .. } | TaskStatus::SkippedNoScript
        )
    }
}

/// Executes a script for every package, respecting dependency order.
///
/// Two scheduling modes: parallel-by-level (a level's launches are all
/// awaited before the next level starts) and fully sequential along the
/// topological order. The graph is computed before any launch and is
/// read-only thereafter; the single controller fans out to the thread
/// pool and joins at each level boundary.
pub struct TaskOrchestrator {
    packages_dir: PathBuf,
    graph: DependencyGraph,
    runner: Arc<dyn CommandRunner>,
    thread_pool: Arc<rayon::ThreadPool>,
}

impl TaskOrchestrator {
    pub fn new(
        packages_dir: impl Into<PathBuf>,
        graph: DependencyGraph,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            graph,
            runner,
            thread_pool: build_pool(None),
        }
    }

    /// Caps the number of packages launched concurrently within a level.
    pub fn with_max_parallel(mut self, max_parallel: Option<usize>) -> Self {
        self.thread_pool = build_pool(max_parallel);
        self
    }

    /// Runs the first declared script from `scripts` for every package,
    /// level by level.
    ///
    /// A failure does not abort siblings already launched in the same
    /// level, but every transitive dependent of a failed package is
    /// reported `Blocked` and never launched.
    ///
    /// # Errors
    ///
    /// Returns an error only for structural problems (a cycle); script
    /// failures are recorded per package in the reports.
    pub fn run_parallel(&self, scripts: &[&str]) -> Result<Vec<TaskReport>> {
        let levels = self.graph.build_levels()?;
        let requested = scripts.first().copied().unwrap_or_default();

        let mut reports = Vec::with_capacity(self.graph.len());
        let mut failed_roots: HashMap<String, String> = HashMap::new();

        for level in levels {
            let mut runnable: Vec<&Package> = Vec::new();
            for name in &level {
                let node = self.graph.node(name)?;
                let blocking = node
                    .internal_deps
                    .iter()
                    .find_map(|dep| failed_roots.get(dep.as_str()).cloned());
                if let Some(root) = blocking {
                    failed_roots.insert(name.clone(), root.clone());
                    reports.push(TaskReport {
                        package: name.clone(),
                        script: requested.to_string(),
                        status: TaskStatus::Blocked {
                            failed_dependency: root,
                        },
                        stdout: String::new(),
                        stderr: String::new(),
                    });
                    continue;
                }
                runnable.push(&node.package);
            }

            if runnable.is_empty() {
                continue;
            }

            debug!(packages = runnable.len(), "launching level");
            let (tx, rx) = channel::unbounded();
            self.thread_pool.install(|| {
                runnable.par_iter().for_each(|package| {
                    let _ = tx.send(self.execute(package, scripts));
                });
            });
            drop(tx);

            let mut level_reports: Vec<TaskReport> = rx.iter().collect();
            level_reports.sort_by_key(|r| level.iter().position(|n| *n == r.package));

            for report in &level_reports {
                if matches!(report.status, TaskStatus::Failed { .. }) {
                    failed_roots.insert(report.package.clone(), report.package.clone());
                }
            }
            reports.extend(level_reports);
        }

        Ok(reports)
    }

    /// Runs packages one at a time along the topological order,
    /// stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error only for structural problems (a cycle).
    pub fn run_sequential(&self, scripts: &[&str]) -> Result<Vec<TaskReport>> {
        let order = self.graph.topological_order()?;
        let mut reports = Vec::with_capacity(order.len());

        for name in order {
            let package = self.graph.package(&name)?;
            let report = self.execute(package, scripts);
            let failed = matches!(report.status, TaskStatus::Failed { .. });
            reports.push(report);
            if failed {
                break;
            }
        }

        Ok(reports)
    }

    fn execute(&self, package: &Package, scripts: &[&str]) -> TaskReport {
        let resolved = scripts
            .iter()
            .find_map(|s| package.manifest.script(s).map(|cmd| (*s, cmd.to_string())));

        let (script_name, command) = match resolved {
            Some(pair) => pair,
            None => {
                return TaskReport {
                    package: package.name.clone(),
                    script: scripts.first().copied().unwrap_or_default().to_string(),
                    status: TaskStatus::SkippedNoScript,
                    stdout: String::new(),
                    stderr: String::new(),
                }
            }
        };

        let package_dir = self.packages_dir.join(&package.path);
        let start = Instant::now();

        match self.runner.run(&package_dir, &command) {
            Ok(output) if output.success() => TaskReport {
                package: package.name.clone(),
                script: script_name.to_string(),
                status: TaskStatus::Success {
                    duration: start.elapsed(),
                },
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Ok(output) => TaskReport {
                package: package.name.clone(),
                script: script_name.to_string(),
                status: TaskStatus::Failed {
                    message: format!("exit code {}", output.exit_code),
                },
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Err(e) => TaskReport {
                package: package.name.clone(),
                script: script_name.to_string(),
                status: TaskStatus::Failed {
                    message: e.to_string(),
                },
                stdout: String::new(),
                stderr: String::new(),
            },
        }
    }

    #[inline]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

fn build_pool(num_threads: Option<usize>) -> Arc<rayon::ThreadPool> {
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("monorail-worker-{}", i));
    if let Some(n) = num_threads {
        builder = builder.num_threads(n);
    }
    Arc::new(
        builder
            .build()
            .unwrap_or_else(|_| rayon::ThreadPoolBuilder::new().build().unwrap()),
    )
}
