//! # Namespaced Filesystem
//!
//! Makes a map of independently rooted filesystems look like one filesystem.
//! The first path segment selects the namespace, the rest is resolved inside
//! it: `quotes/quote.tmpl.html` reads `quote.tmpl.html` from the filesystem
//! registered as `quotes`.
//!
//! Registration happens during setup; afterwards the overlay is only read, so
//! concurrent lookups need no locking.

use std::collections::BTreeMap;
use std::io;

use super::{join_clean, File, Filesystem, SubFs};
use crate::error::VfsError;

/// Namespace → filesystem overlay addressed as `"<namespace>/<relative-path>"`.
#[derive(Debug, Default)]
pub struct NamespacedFs {
    namespaces: BTreeMap<String, Box<dyn Filesystem>>,
}

impl NamespacedFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `namespace` to the subtree of `fs` rooted at `subdir`.
    ///
    /// Fails with [`VfsError::PathFormat`] when `namespace` is not a single
    /// path segment, [`VfsError::NamespaceExists`] when it is already bound and
    /// [`VfsError::Filesystem`] when `subdir` does not exist in `fs`.
    pub fn register<F>(&mut self, namespace: &str, subdir: &str, fs: F) -> Result<(), VfsError>
    where
        F: Filesystem + 'static,
    {
        if namespace.is_empty() || namespace.contains('/') || namespace == "." || namespace == ".."
        {
            return Err(VfsError::path_format(namespace));
        }
        if self.namespaces.contains_key(namespace) {
            return Err(VfsError::NamespaceExists {
                namespace: namespace.to_string(),
            });
        }

        let sub = SubFs::new(fs, subdir)
            .map_err(|e| VfsError::filesystem(format!("{namespace}:{subdir}"), e))?;
        tracing::debug!(namespace, subdir, "Registered namespace filesystem");
        self.namespaces.insert(namespace.to_string(), Box::new(sub));
        Ok(())
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Read the file at `"<namespace>/<path>"`.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        let (namespace, internal) = split_namespace(path)?;
        self.get(namespace)?
            .read_file(&internal)
            .map_err(|e| VfsError::filesystem(path, e))
    }

    /// Open the file at `"<namespace>/<path>"`.
    pub fn open_file(&self, path: &str) -> Result<File, VfsError> {
        let (namespace, internal) = split_namespace(path)?;
        self.get(namespace)?
            .open(&internal)
            .map_err(|e| VfsError::filesystem(path, e))
    }

    /// Glob `"<namespace>/<pattern>"`. Every result carries the namespace
    /// prefix, so it can be passed straight back to [`read`](Self::read).
    pub fn glob_paths(&self, pattern: &str) -> Result<Vec<String>, VfsError> {
        let (namespace, internal) = split_namespace(pattern)?;
        let matches = self
            .get(namespace)?
            .glob(&internal)
            .map_err(|e| VfsError::filesystem(pattern, e))?;
        Ok(matches
            .into_iter()
            .map(|m| format!("{namespace}/{m}"))
            .collect())
    }

    fn get(&self, namespace: &str) -> Result<&dyn Filesystem, VfsError> {
        self.namespaces
            .get(namespace)
            .map(|fs| fs.as_ref())
            .ok_or_else(|| VfsError::NamespaceNotFound {
                namespace: namespace.to_string(),
            })
    }
}

/// Split a path into the namespace before the first `/` and the cleaned rest.
fn split_namespace(path: &str) -> Result<(&str, String), VfsError> {
    let mut segments = path.split('/');
    let namespace = segments.next().unwrap_or_default();
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        return Err(VfsError::path_format(path));
    }
    Ok((namespace, join_clean(rest)))
}

impl Filesystem for NamespacedFs {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.read(path).map_err(into_io)
    }

    fn open(&self, path: &str) -> io::Result<File> {
        self.open_file(path).map_err(into_io)
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        self.glob_paths(pattern).map_err(into_io)
    }
}

fn into_io(err: VfsError) -> io::Error {
    match err {
        VfsError::Filesystem { source, .. } => source,
        VfsError::NamespaceNotFound { .. } => io::Error::new(io::ErrorKind::NotFound, err),
        other => io::Error::new(io::ErrorKind::InvalidInput, other),
    }
}
