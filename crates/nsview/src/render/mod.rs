//! # Template Renderer
//!
//! Resolves, compiles and executes namespaced template sets on demand.
//!
//! ## Template sets
//!
//! A render of `"<namespace>/.../<file>"` assembles its set from
//!
//! 1. every global namespace's top-level `*.html` templates, in registration order
//! 2. the top-level `*.html` templates of the requested template's directory
//!
//! Each source is registered under its base filename, then the template named
//! `<file>` is executed. A later source with the same base filename replaces an
//! earlier one, so a namespace can shadow a global template.
//!
//! Nothing is cached: every call discovers and compiles its own set, which
//! keeps concurrent renders fully independent.
//!
//! ## Data
//!
//! The render data is bound as `data` (`{{ data }}`). When it is a map, its
//! top-level keys are bound directly as well (`{{ title }}`).
//!
//! ## Output
//!
//! Output goes straight to the writer as it is produced. A failure partway
//! through execution leaves what was already written in place.

mod builder;

use std::io::Write;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tera::{Context, Tera, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::RenderError;
use crate::funcs::{self, SetSlot};
use crate::globals::{external_base_path, GlobalStore};
use crate::vfs::NamespacedFs;

pub use builder::RendererBuilder;

/// Subdirectory of a contributed filesystem that holds its templates.
pub const VIEW_SUBDIRECTORY: &str = "views";

/// Pattern selecting the templates of one directory.
pub const TEMPLATE_GLOB: &str = "*.html";

const DATA_KEY: &str = "data";

/// Serving-phase renderer. Immutable, `Send + Sync`; share it behind an `Arc`.
#[derive(Debug)]
pub struct Renderer {
    vfs: NamespacedFs,
    global_patterns: Vec<String>,
    root_template: String,
    not_found_template: Option<String>,
    base_path: String,
    globals: Arc<GlobalStore>,
}

impl Renderer {
    /// Shorthand for [`RendererBuilder::new`].
    pub fn builder(root_template: impl Into<String>, root_url_path: &str) -> RendererBuilder {
        RendererBuilder::new(root_template, root_url_path)
    }

    /// Canonical base path; `/` for the root.
    pub fn base_path(&self) -> &str {
        external_base_path(&self.base_path)
    }

    pub fn root_template(&self) -> &str {
        &self.root_template
    }

    pub fn not_found_template(&self) -> Option<&str> {
        self.not_found_template.as_deref()
    }

    pub fn globals(&self) -> &GlobalStore {
        &self.globals
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.vfs.namespaces()
    }

    /// Render `name` with `data` into `out`.
    pub fn render<W, T>(&self, out: &mut W, name: &str, data: &T) -> Result<(), RenderError>
    where
        W: Write + ?Sized,
        T: Serialize + ?Sized,
    {
        self.render_inner(None, out, name, data)
    }

    /// [`render`](Self::render) that gives up when `cancel` fires before
    /// discovery or before execution.
    pub fn render_cancellable<W, T>(
        &self,
        cancel: &CancellationToken,
        out: &mut W,
        name: &str,
        data: &T,
    ) -> Result<(), RenderError>
    where
        W: Write + ?Sized,
        T: Serialize + ?Sized,
    {
        self.render_inner(Some(cancel), out, name, data)
    }

    /// Render into a fresh string.
    pub fn render_to_string<T>(&self, name: &str, data: &T) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
    {
        let mut buf = Vec::new();
        self.render(&mut buf, name, data)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn render_inner<W, T>(
        &self,
        cancel: Option<&CancellationToken>,
        out: &mut W,
        name: &str,
        data: &T,
    ) -> Result<(), RenderError>
    where
        W: Write + ?Sized,
        T: Serialize + ?Sized,
    {
        info!(page = %name, "render");
        check_cancelled(cancel, name)?;

        let set = self.compile(name)?;
        let tera = set
            .get()
            .ok_or_else(|| RenderError::parse(name, tera::Error::msg("template set is empty")))?;

        let data = tera::to_value(data)
            .map_err(|e| RenderError::execute(name, tera::Error::chain("serialize render data", e)))?;

        check_cancelled(cancel, name)?;
        tera.render_to(base_name(name), &data_context(&data), out)
            .map_err(|e| RenderError::execute(name, e))
    }

    /// Discover and compile the template set for `name`.
    fn compile(&self, name: &str) -> Result<SetSlot, RenderError> {
        let patterns = self
            .global_patterns
            .iter()
            .cloned()
            .chain(std::iter::once(directory_pattern(name)));

        let mut sources: Vec<(String, String)> = Vec::new();
        for pattern in patterns {
            let matches = self.vfs.glob_paths(&pattern)?;
            if matches.is_empty() {
                return Err(RenderError::EmptyPattern { pattern });
            }
            for path in matches {
                let bytes = self.vfs.read(&path)?;
                let source = String::from_utf8(bytes).map_err(|e| {
                    RenderError::parse(
                        name,
                        tera::Error::chain(format!("template {path:?} is not UTF-8"), e),
                    )
                })?;
                debug!(template = %path, "Discovered template");
                sources.push((base_name(&path).to_string(), source));
            }
        }

        let slot: SetSlot = Arc::new(OnceLock::new());
        let mut tera = Tera::default();
        tera.set_escape_fn(escape_html);
        funcs::register(&mut tera, Arc::clone(&self.globals), Arc::downgrade(&slot));
        tera.add_raw_templates(sources)
            .map_err(|e| RenderError::parse(name, e))?;
        debug!(
            page = %name,
            templates = tera.get_template_names().count(),
            "Compiled template set"
        );

        slot.set(tera).map_err(|_| {
            RenderError::parse(name, tera::Error::msg("template set compiled twice"))
        })?;
        Ok(slot)
    }
}

fn check_cancelled(cancel: Option<&CancellationToken>, name: &str) -> Result<(), RenderError> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(RenderError::Cancelled {
            template: name.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Last path segment of a template name.
fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Pattern for the templates next to `name`. A name without a directory
/// gives the bare pattern, which the overlay rejects as unaddressable.
fn directory_pattern(name: &str) -> String {
    match name.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{TEMPLATE_GLOB}"),
        None => TEMPLATE_GLOB.to_string(),
    }
}

/// HTML-escape text output: `&`, `<`, `>`, `"` and `'`. Unlike tera's default
/// escaper, `/` is left alone so URL paths survive.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the execution context for a data value.
pub(crate) fn data_context(data: &Value) -> Context {
    let mut context = Context::new();
    if let Value::Object(map) = data {
        for (key, value) in map {
            context.insert(key.as_str(), value);
        }
    }
    context.insert(DATA_KEY, data);
    context
}
