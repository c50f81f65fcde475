//! Command implementations for the CLI.

mod execution;
mod release;
mod status;
mod sync;

use std::path::Path;

use anyhow::Result;
use monorail_core::{DependencyGraph, Package, Scanner, WorkspaceConfig};

pub use execution::{cmd_build, cmd_test};
pub use release::{cmd_publish, cmd_rollback, cmd_verify, cmd_version};
pub use status::cmd_status;
pub use sync::cmd_sync_deps;

fn load_packages(packages_dir: &Path) -> Result<Vec<Package>> {
    Ok(Scanner::new(packages_dir).scan()?)
}

fn load_graph(packages_dir: &Path) -> Result<DependencyGraph> {
    Ok(DependencyGraph::build(load_packages(packages_dir)?)?)
}

fn load_config(packages_dir: &Path) -> Result<WorkspaceConfig> {
    Ok(WorkspaceConfig::discover(packages_dir)?)
}

/// Repository root for tag operations: the workspace config's directory
/// when one exists, otherwise the parent of the packages directory.
fn repo_root(packages_dir: &Path, config: &WorkspaceConfig) -> std::path::PathBuf {
    config
        .config_path
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .or_else(|| packages_dir.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| packages_dir.to_path_buf())
}
