//! Subtree view of another filesystem.

use std::io;

use super::{invalid_path, not_found, valid_path, File, Filesystem};

/// The subtree of `inner` rooted at `dir`.
///
/// Paths given to a `SubFs` are resolved as `dir/path`; glob results come back
/// with the `dir/` prefix removed.
#[derive(Debug)]
pub struct SubFs<F> {
    dir: String,
    inner: F,
}

impl<F: Filesystem> SubFs<F> {
    /// Create the view. Fails when `dir` is not a valid path or does not exist
    /// in `inner`.
    pub fn new(inner: F, dir: impl Into<String>) -> io::Result<Self> {
        let dir = dir.into();
        if !valid_path(&dir) {
            return Err(invalid_path(&dir));
        }
        if dir != "." && inner.glob(&glob::Pattern::escape(&dir))?.is_empty() {
            return Err(not_found(&dir));
        }
        Ok(Self { dir, inner })
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    fn full(&self, path: &str) -> io::Result<String> {
        if !valid_path(path) {
            return Err(invalid_path(path));
        }
        Ok(match (self.dir.as_str(), path) {
            (".", _) => path.to_string(),
            (dir, ".") => dir.to_string(),
            (dir, _) => format!("{dir}/{path}"),
        })
    }
}

impl<F: Filesystem> Filesystem for SubFs<F> {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.inner.read_file(&self.full(path)?)
    }

    fn open(&self, path: &str) -> io::Result<File> {
        self.inner.open(&self.full(path)?)
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        if pattern.split('/').any(|elem| elem == "..") {
            return Err(invalid_path(pattern));
        }
        if self.dir == "." {
            return self.inner.glob(pattern);
        }
        let full = format!("{}/{}", glob::Pattern::escape(&self.dir), pattern);
        let prefix = format!("{}/", self.dir);
        Ok(self
            .inner
            .glob(&full)?
            .into_iter()
            .filter_map(|m| m.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemFs;

    fn tree() -> MemFs {
        MemFs::new()
            .with_file("views/index.html", "index")
            .with_file("views/layout.html", "layout")
            .with_file("static/app.css", "css")
    }

    #[test]
    fn test_sub_reads_relative_to_dir() {
        let sub = SubFs::new(tree(), "views").unwrap();
        assert_eq!(sub.read_file("index.html").unwrap(), b"index");
        assert!(sub.read_file("app.css").is_err());
    }

    #[test]
    fn test_sub_missing_dir_fails() {
        let err = SubFs::new(tree(), "templates").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_sub_invalid_dir_fails() {
        let err = SubFs::new(tree(), "../views").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_sub_glob_strips_prefix() {
        let sub = SubFs::new(tree(), "views").unwrap();
        assert_eq!(sub.glob("*.html").unwrap(), vec!["index.html", "layout.html"]);
    }

    #[test]
    fn test_sub_of_root() {
        let sub = SubFs::new(tree(), ".").unwrap();
        assert_eq!(sub.read_file("static/app.css").unwrap(), b"css");
    }
}
