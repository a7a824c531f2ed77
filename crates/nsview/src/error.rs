//! # Error Types
//!
//! Setup-time and render-time failures. Structural addressing is strict (a bad
//! path or unknown namespace fails the call); lookups made from inside
//! templates (`global`, `yield`) never produce these errors.

use std::io;

use thiserror::Error;

/// Failures of the namespaced filesystem overlay.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The path does not decompose into `<namespace>/<relative-path>`.
    #[error("path {path:?} requires at least two levels: namespace/filepath")]
    PathFormat { path: String },

    #[error("namespace {namespace:?} does not exist")]
    NamespaceNotFound { namespace: String },

    #[error("namespace {namespace:?} is already registered")]
    NamespaceExists { namespace: String },

    /// The backing filesystem rejected the read, open or glob.
    #[error("filesystem error for {path:?}: {source}")]
    Filesystem { path: String, source: io::Error },
}

impl VfsError {
    pub(crate) fn path_format(path: impl Into<String>) -> Self {
        Self::PathFormat { path: path.into() }
    }

    pub(crate) fn filesystem(path: impl Into<String>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            VfsError::PathFormat { .. } => ErrorKind::PathFormat,
            VfsError::NamespaceNotFound { .. } => ErrorKind::NamespaceNotFound,
            VfsError::NamespaceExists { .. } | VfsError::Filesystem { .. } => {
                ErrorKind::Filesystem
            }
        }
    }
}

/// Failure to store a global value.
#[derive(Debug, Error)]
pub enum GlobalError {
    #[error("global value {key:?} cannot be serialized: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    #[error("global key {key:?} is reserved")]
    Reserved { key: String },
}

/// Failures of a single render call.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error("template pattern {pattern:?} matches no files")]
    EmptyPattern { pattern: String },

    #[error("parse templates for {template:?}: {source}")]
    Parse {
        template: String,
        source: tera::Error,
    },

    #[error("execute template {template:?}: {source}")]
    Execute {
        template: String,
        source: tera::Error,
    },

    #[error("render of {template:?} cancelled")]
    Cancelled { template: String },
}

impl RenderError {
    pub(crate) fn parse(template: impl Into<String>, source: tera::Error) -> Self {
        Self::Parse {
            template: template.into(),
            source,
        }
    }

    pub(crate) fn execute(template: impl Into<String>, source: tera::Error) -> Self {
        Self::Execute {
            template: template.into(),
            source,
        }
    }

    /// Taxonomy bucket of this error, for callers that map failures distinctly.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Vfs(e) => e.kind(),
            RenderError::EmptyPattern { .. } | RenderError::Parse { .. } => ErrorKind::Parse,
            RenderError::Execute { .. } => ErrorKind::Execute,
            RenderError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }
}

/// Error taxonomy shared by [`VfsError`] and [`RenderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Fewer than two path segments.
    PathFormat,
    /// Unregistered first path segment.
    NamespaceNotFound,
    /// Registration, read, open or glob failure.
    Filesystem,
    /// Template syntax error, or a pattern that matched nothing.
    Parse,
    /// Missing field, type mismatch or function error during execution.
    Execute,
    Cancelled,
}
