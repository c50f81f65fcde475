//! Git release tagging.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use git2::{ObjectType, Repository};
use monorail_core::error::{Error, Result};
use monorail_core::registry::VcsTagger;
use tracing::debug;

/// `VcsTagger` implementation over a git repository.
///
/// Local tag operations go through libgit2; remote tag deletion shells
/// out to the system git so credentials come from the user's setup.
pub struct GitTagger {
    repo_root: PathBuf,
    remote: String,
}

impl GitTagger {
    pub fn new(repo_root: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            remote: remote.into(),
        }
    }

    pub fn with_default_remote(repo_root: impl Into<PathBuf>) -> Self {
        Self::new(repo_root, "origin")
    }

    fn open(&self) -> Result<Repository> {
        Repository::discover(&self.repo_root).map_err(|e| {
            Error::Tag(format!(
                "no git repository at {}: {}",
                self.repo_root.display(),
                e
            ))
        })
    }
}

impl VcsTagger for GitTagger {
    fn tag(&self, name: &str, message: &str) -> Result<()> {
        let repo = self.open()?;
        let head = repo
            .head()
            .and_then(|h| h.peel(ObjectType::Commit))
            .map_err(|e| Error::Tag(format!("failed to resolve HEAD: {}", e)))?;
        let signature = repo
            .signature()
            .map_err(|e| Error::Tag(format!("no git signature configured: {}", e)))?;

        repo.tag(name, &head, &signature, message, false)
            .map_err(|e| Error::Tag(format!("failed to create tag {}: {}", name, e)))?;
        debug!(tag = name, "created annotated tag");
        Ok(())
    }

    fn remove_tag(&self, name: &str) -> Result<()> {
        let repo = self.open()?;
        repo.tag_delete(name)
            .map_err(|e| Error::Tag(format!("failed to delete tag {}: {}", name, e)))
    }

    fn remove_remote_tag(&self, name: &str) -> Result<()> {
        let refspec = format!("refs/tags/{}", name);
        let output = git_command(&self.repo_root)
            .arg("push")
            .arg(&self.remote)
            .arg("--delete")
            .arg(&refspec)
            .output()
            .map_err(|e| Error::Tag(format!("failed to launch git push: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Tag(format!(
                "failed to delete {} on {}: {}",
                refspec,
                self.remote,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

fn git_command(repo_root: &Path) -> Command {
    let mut command = Command::new("git");
    command
        .arg("-C")
        .arg(repo_root)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}
