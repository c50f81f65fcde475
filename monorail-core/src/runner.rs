//! Script execution over package directories.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Captured result of one subprocess invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[inline]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Capability for running a package script.
///
/// The orchestrators only see `{exit code, stdout, stderr}`; injecting
/// the runner keeps them testable without real subprocesses.
pub trait CommandRunner: Send + Sync {
    /// Runs a shell command in the given package directory.
    ///
    /// # Errors
    ///
    /// Returns an error only when the command cannot be launched at
    /// all; a command that runs and exits non-zero is a normal
    /// `CommandOutput`.
    fn run(&self, package_dir: &Path, command: &str) -> Result<CommandOutput>;
}

/// Production runner: `sh -c <command>` with piped output.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, package_dir: &Path, command: &str) -> Result<CommandOutput> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(package_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::Script {
                package: package_dir.display().to_string(),
                script: command.to_string(),
                message: format!("Failed to launch command: {}", e),
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
