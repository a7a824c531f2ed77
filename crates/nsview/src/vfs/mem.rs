//! In-memory filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor};
use std::sync::Arc;

use glob::Pattern;

use super::{bad_pattern, invalid_path, match_options, not_found, valid_path, File, Filesystem};

/// A read-only tree held in memory, keyed by `/`-separated path.
///
/// Directories are implied by the file paths: `views/index.html` makes
/// `views` exist as well.
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    files: BTreeMap<String, Arc<[u8]>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style. Invalid paths are ignored with a warning.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file. Returns `false` when the path is invalid.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl AsRef<[u8]>) -> bool {
        let path = path.into();
        if !valid_path(&path) || path == "." {
            tracing::warn!(%path, "Ignoring in-memory file with invalid path");
            return false;
        }
        self.files.insert(path, Arc::from(contents.as_ref()));
        true
    }

    fn lookup(&self, path: &str) -> io::Result<&Arc<[u8]>> {
        if !valid_path(path) {
            return Err(invalid_path(path));
        }
        self.files.get(path).ok_or_else(|| not_found(path))
    }

    /// Every file and implied directory, sorted.
    fn entries(&self) -> BTreeSet<&str> {
        let mut entries = BTreeSet::new();
        for path in self.files.keys() {
            entries.insert(path.as_str());
            let mut rest = path.as_str();
            while let Some((dir, _)) = rest.rsplit_once('/') {
                entries.insert(dir);
                rest = dir;
            }
        }
        entries
    }
}

impl Filesystem for MemFs {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.lookup(path).map(|contents| contents.to_vec())
    }

    /// Implied directories open as an empty stream, like on-disk ones.
    fn open(&self, path: &str) -> io::Result<File> {
        match self.lookup(path) {
            Ok(contents) => Ok(Box::new(Cursor::new(Arc::clone(contents)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if path == "." || self.entries().contains(path) {
                    Ok(Box::new(io::empty()))
                } else {
                    Err(e)
                }
            }
            Err(e) => Err(e),
        }
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        let compiled = Pattern::new(pattern).map_err(|e| bad_pattern(pattern, e))?;
        let options = match_options();
        Ok(self
            .entries()
            .into_iter()
            .filter(|entry| compiled.matches_with(entry, options))
            .map(str::to_string)
            .collect())
    }
}
