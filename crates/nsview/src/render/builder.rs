//! Setup phase: collect namespaces, globals and page designations.

use std::sync::Arc;

use serde::Serialize;
use tera::Value;

use super::{Renderer, TEMPLATE_GLOB, VIEW_SUBDIRECTORY};
use crate::error::{GlobalError, VfsError};
use crate::globals::{external_base_path, normalize_base_path, GlobalStore, BASE_PATH_KEY};
use crate::vfs::{Filesystem, NamespacedFs};

/// Mutable setup-phase state. [`build`](Self::build) freezes it into a
/// [`Renderer`] that can be shared across request handlers.
#[derive(Debug)]
pub struct RendererBuilder {
    vfs: NamespacedFs,
    global_patterns: Vec<String>,
    root_template: String,
    not_found_template: Option<String>,
    base_path: String,
    globals: GlobalStore,
}

impl RendererBuilder {
    /// Start a renderer whose base path serves `root_template`.
    ///
    /// `root_url_path` is normalized to an absolute path and stored as the
    /// `basepath` global: `"app"` becomes `"/app"`, `"/"` stays `"/"`.
    /// Templates joining it with a page path should trim the trailing slash:
    /// `{{ global(key="basepath") | trimSuffix(suffix="/") }}/quote`.
    pub fn new(root_template: impl Into<String>, root_url_path: &str) -> Self {
        let base_path = normalize_base_path(root_url_path);
        let mut globals = GlobalStore::new();
        globals.set_value(
            BASE_PATH_KEY,
            Value::String(external_base_path(&base_path).to_string()),
        );
        Self {
            vfs: NamespacedFs::new(),
            global_patterns: Vec::new(),
            root_template: root_template.into(),
            not_found_template: None,
            base_path,
            globals,
        }
    }

    /// Register the `views` subtree of `fs` as `namespace`.
    ///
    /// With `is_global`, the namespace's top-level templates become part of
    /// every render's template set. Global templates should have distinct
    /// file names: when two global namespaces share one, which of them wins is
    /// not specified (it is stable for a given registration order).
    pub fn register_namespace<F>(
        &mut self,
        namespace: &str,
        fs: F,
        is_global: bool,
    ) -> Result<(), VfsError>
    where
        F: Filesystem + 'static,
    {
        self.vfs.register(namespace, VIEW_SUBDIRECTORY, fs)?;
        if is_global {
            self.global_patterns
                .push(format!("{namespace}/{TEMPLATE_GLOB}"));
        }
        tracing::debug!(namespace, is_global, "Registered template namespace");
        Ok(())
    }

    /// Store a constant readable from templates as `global(key=...)`.
    ///
    /// The reserved `basepath` key cannot be overwritten.
    pub fn set_global<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), GlobalError> {
        if key == BASE_PATH_KEY {
            return Err(GlobalError::Reserved {
                key: key.to_string(),
            });
        }
        self.globals.set(key, value)
    }

    /// Template rendered for every request path other than the base path.
    pub fn set_not_found(&mut self, template: impl Into<String>) {
        self.not_found_template = Some(template.into());
    }

    pub fn base_path(&self) -> &str {
        external_base_path(&self.base_path)
    }

    pub fn build(self) -> Renderer {
        if self.not_found_template.is_none() {
            tracing::warn!("No not-found template designated; unknown paths will get an empty 404");
        }
        Renderer {
            vfs: self.vfs,
            global_patterns: self.global_patterns,
            root_template: self.root_template,
            not_found_template: self.not_found_template,
            base_path: self.base_path,
            globals: Arc::new(self.globals),
        }
    }
}
