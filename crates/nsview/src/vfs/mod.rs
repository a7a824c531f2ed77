//! Virtual filesystems for template discovery.
//!
//! Every template source reaches the renderer through the [`Filesystem`]
//! capability: read a file, open a file, glob a pattern. Paths are always
//! relative and `/`-separated, whatever the backing store.
//!
//! - [`DirFs`]: an on-disk directory
//! - [`MemFs`]: an in-memory tree (bundled sources, tests)
//! - [`SubFs`]: the subtree of another filesystem
//! - [`NamespacedFs`]: N filesystems merged under namespace keys

mod dir;
mod mem;
mod namespaced;
mod sub;

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

pub use dir::DirFs;
pub use mem::MemFs;
pub use namespaced::NamespacedFs;
pub use sub::SubFs;

/// An open file handle returned by [`Filesystem::open`].
pub type File = Box<dyn Read + Send>;

/// Read/open/glob access to a tree of files.
///
/// Object-safe so heterogeneous backends can sit side by side in one
/// [`NamespacedFs`].
pub trait Filesystem: Send + Sync + fmt::Debug {
    /// Read the whole file at `path`.
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Open the file at `path` for streaming reads. Directories open as an
    /// empty stream, so every `glob` match can be opened.
    fn open(&self, path: &str) -> io::Result<File>;

    /// Return the paths matching `pattern`, sorted. `*` and `?` never match `/`.
    fn glob(&self, pattern: &str) -> io::Result<Vec<String>>;
}

impl<T: Filesystem + ?Sized> Filesystem for Arc<T> {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        (**self).read_file(path)
    }

    fn open(&self, path: &str) -> io::Result<File> {
        (**self).open(path)
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        (**self).glob(pattern)
    }
}

impl<T: Filesystem + ?Sized> Filesystem for Box<T> {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        (**self).read_file(path)
    }

    fn open(&self, path: &str) -> io::Result<File> {
        (**self).open(path)
    }

    fn glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        (**self).glob(pattern)
    }
}

/// Whether `path` is a valid relative filesystem path.
///
/// `.` names the root. Otherwise the path must be non-empty, must not start or
/// end with `/`, and must not contain empty, `.` or `..` elements.
pub(crate) fn valid_path(path: &str) -> bool {
    if path == "." {
        return true;
    }
    !path.is_empty()
        && path
            .split('/')
            .all(|elem| !elem.is_empty() && elem != "." && elem != "..")
}

/// Lexically join and clean path segments.
///
/// Empty and `.` elements are dropped and `..` consumes its parent where one
/// exists. All-empty input gives `""`; input that cleans away entirely gives `.`.
pub(crate) fn join_clean<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut saw_any = false;
    let mut out: Vec<&str> = Vec::new();
    for seg in segments {
        if seg.is_empty() {
            continue;
        }
        saw_any = true;
        match seg {
            "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            _ => out.push(seg),
        }
    }
    if !saw_any {
        return String::new();
    }
    if out.is_empty() {
        return ".".to_string();
    }
    out.join("/")
}

pub(crate) fn invalid_path(path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("invalid path {path:?}"),
    )
}

pub(crate) fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{path:?} does not exist"))
}

pub(crate) fn bad_pattern(pattern: &str, err: glob::PatternError) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("bad glob pattern {pattern:?}: {err}"),
    )
}

/// Glob options shared by every backend.
pub(crate) fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}
