//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error in {path}: {error}")]
    Json {
        error: serde_json::Error,
        path: PathBuf,
    },

    #[error("JSON serialize error: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("Package not found: {name}. Known packages: {available}")]
    PackageNotFound { name: String, available: String },

    #[error("Duplicate package name: {name} (declared at {first} and {second})")]
    DuplicatePackage {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Package {package} declares a dependency on itself")]
    SelfDependency { package: String },

    #[error(
        "Package {package} references internal dependency {dependency} which is not in the graph"
    )]
    UnresolvedInternalDependency { package: String, dependency: String },

    #[error("Circular dependency detected involving: {0}. Use 'monorail status' to inspect the graph.")]
    CircularDependency(String),

    #[error("Invalid version {version}: {source}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },

    #[error("Script {script} failed for {package}: {message}")]
    Script {
        package: String,
        script: String,
        message: String,
    },

    #[error("Registry error for {package}: {message}")]
    Registry { package: String, message: String },

    #[error("Publish failed for {package}: {message}")]
    Publish { package: String, message: String },

    #[error("Tag operation failed: {0}")]
    Tag(String),

    #[error("Changelog error: {0}")]
    Changelog(String),
}

pub type Result<T> = std::result::Result<T, Error>;
