//! npm registry client.
//!
//! Drives the `npm` CLI rather than speaking the registry protocol
//! directly, so authentication and proxy handling stay with the user's
//! npm configuration.

use std::path::Path;
use std::process::{Command, Stdio};

use monorail_core::error::{Error, Result};
use monorail_core::registry::Registry;
use tracing::debug;

/// `Registry` implementation backed by the `npm` command-line tool.
pub struct NpmRegistry {
    registry_url: Option<String>,
}

impl NpmRegistry {
    /// Creates a client for the given registry endpoint, or npm's
    /// configured default when `None`.
    pub fn new(registry_url: Option<String>) -> Self {
        Self { registry_url }
    }

    fn npm(&self) -> Command {
        let mut command = Command::new("npm");
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(url) = &self.registry_url {
            command.arg("--registry").arg(url);
        }
        command
    }

    fn run(&self, command: &mut Command, package: &str) -> Result<std::process::Output> {
        command.output().map_err(|e| Error::Registry {
            package: package.to_string(),
            message: format!("failed to launch npm: {}", e),
        })
    }
}

impl Registry for NpmRegistry {
    fn exists(&self, name: &str, version: &str) -> Result<bool> {
        let spec = format!("{}@{}", name, version);
        let output = self.run(self.npm().arg("view").arg(&spec).arg("version"), name)?;

        if output.status.success() {
            // npm prints the resolved version when the spec exists.
            return Ok(!output.stdout.is_empty());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("E404") || stderr.contains("404 Not Found") {
            debug!(spec = %spec, "not on registry");
            return Ok(false);
        }

        Err(Error::Registry {
            package: name.to_string(),
            message: format!("npm view {} failed: {}", spec, stderr.trim()),
        })
    }

    fn pack_check(&self, package_dir: &Path) -> Result<()> {
        let package = package_dir.display().to_string();
        let output = self.run(
            self.npm().arg("pack").arg("--dry-run").current_dir(package_dir),
            &package,
        )?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Registry {
                package,
                message: format!(
                    "npm pack --dry-run failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }

    fn publish(&self, package_dir: &Path) -> Result<()> {
        let package = package_dir.display().to_string();
        let output = self.run(self.npm().arg("publish").current_dir(package_dir), &package)?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Publish {
                package,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn unpublish(&self, name: &str, version: &str) -> Result<()> {
        let spec = format!("{}@{}", name, version);
        let output = self.run(self.npm().arg("unpublish").arg(&spec), name)?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Registry {
                package: name.to_string(),
                message: format!(
                    "npm unpublish {} failed: {}",
                    spec,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }
}
