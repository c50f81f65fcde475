//! Core library for monorepo build and release orchestration.

pub mod build;
pub mod changelog;
pub mod config;
pub mod conflict;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod package;
pub mod publish;
pub mod registry;
pub mod release;
pub mod runner;
pub mod scanner;

pub use build::{TaskOrchestrator, TaskReport, TaskStatus};
pub use changelog::Changelog;
pub use config::WorkspaceConfig;
pub use conflict::{ConflictResolver, SyncChange, VersionConflict};
pub use error::{Error, Result};
pub use graph::{DependencyGraph, GraphNode};
pub use manifest::{Manifest, MANIFEST_FILE};
pub use package::Package;
pub use publish::{
    PublishOptions, PublishOrchestrator, PublishRecord, PublishStatus, RollbackOutcome,
    RollbackRecord, RollbackReport, VerifyOutcome, VerifyRecord,
};
pub use registry::{Registry, VcsTagger};
pub use release::{ReleaseEngine, VersionBump};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
pub use scanner::Scanner;
