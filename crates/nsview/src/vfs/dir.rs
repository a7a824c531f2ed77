//! On-disk directory filesystem.

use std::io;
use std::path::{Component, Path, PathBuf};

use super::{bad_pattern, invalid_path, match_options, valid_path, File, Filesystem};

/// A filesystem rooted at a directory on disk. Paths never escape the root.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    /// Root the filesystem at `root`. `.` components are dropped, so `./views`
    /// and `views/` name the same root as `views`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = without_cur_dir(&root.into()).collect();
        let root = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root
        };
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        if !valid_path(path) {
            return Err(invalid_path(path));
        }
        if path == "." {
            return Ok(self.root.clone());
        }
        Ok(path.split('/').fold(self.root.clone(), |acc, elem| acc.join(elem)))
    }

    /// Path of a glob match relative to the root, compared component-wise so a
    /// leading `./` on either side does not matter.
    fn relative(&self, path: &Path) -> Option<String> {
        let mut rest = without_cur_dir(path);
        for root_part in without_cur_dir(&self.root) {
            if rest.next()? != root_part {
                return None;
            }
        }
        let parts: Option<Vec<&str>> = rest.map(|c| c.as_os_str().to_str()).collect();
        let parts = parts?;
        if parts.is_empty() {
            return Some(".".to_string());
        }
        Some(parts.join("/"))
    }
}

fn without_cur_dir(path: &Path) -> impl Iterator<Item = Component<'_>> {
    path.components().filter(|c| !matches!(c, Component::CurDir))
}

impl Filesystem for DirFs {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path)?)
    }

    /// Directories open as an empty stream, so every glob match can be opened.
    fn open(&self, path: &str) -> io::Result<File> {
        let full = self.resolve(path)?;
        if full.is_dir() {
            return Ok(Box::new(io::empty()));
        }
        Ok(Box::new(std::fs::File::open(full)?))
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        if pattern.split('/').any(|elem| elem == "..") || pattern.starts_with('/') {
            return Err(invalid_path(pattern));
        }
        let root = self.root.to_string_lossy();
        let full = format!("{}/{}", glob::Pattern::escape(&root), pattern);

        let entries =
            glob::glob_with(&full, match_options()).map_err(|e| bad_pattern(pattern, e))?;

        let mut matches = Vec::new();
        for entry in entries {
            let path = entry.map_err(glob::GlobError::into_error)?;
            match self.relative(&path) {
                Some(rel) => matches.push(rel),
                None => tracing::debug!(?path, "Skipping glob match outside root or not UTF-8"),
            }
        }
        matches.sort();
        Ok(matches)
    }
}
