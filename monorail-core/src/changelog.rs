//! Release changelog maintenance.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

const HEADER: &str = "# Changelog\n\n";

/// Appends release entries to a changelog file, newest first.
pub struct Changelog;

impl Changelog {
    /// Prepends an entry for `version` listing the released packages.
    ///
    /// The file is created on first use. The date is injected by the
    /// caller so entries stay deterministic under test.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn prepend(path: &Path, version: &str, date: &str, packages: &[String]) -> Result<()> {
        let existing = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let entry = Self::render_entry(version, date, packages);
        let body = existing.strip_prefix(HEADER).unwrap_or(&existing);

        let mut content = String::with_capacity(HEADER.len() + entry.len() + body.len());
        content.push_str(HEADER);
        content.push_str(&entry);
        content.push_str(body);

        fs::write(path, content)
            .map_err(|e| Error::Changelog(format!("failed to write {}: {}", path.display(), e)))
    }

    fn render_entry(version: &str, date: &str, packages: &[String]) -> String {
        let mut entry = format!("## v{} ({})\n\n", version, date);
        for name in packages {
            entry.push_str(&format!("- {}@{}\n", name, version));
        }
        entry.push('\n');
        entry
    }
}
