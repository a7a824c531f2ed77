//! Namespace-isolated template composition for server-rendered pages.
//!
//! Independently developed components ("domains") each contribute a template
//! tree. The renderer merges those trees into one addressable space,
//! `"<namespace>/<relative-path>"`, while keeping each namespace's templates
//! private unless the namespace was registered as global.
//!
//! # Modules
//!
//! - [`vfs`]: the [`Filesystem`](vfs::Filesystem) capability trait, its backends and
//!   the [`NamespacedFs`](vfs::NamespacedFs) overlay
//! - [`globals`]: setup-time constants exposed to templates through `global(key=...)`
//! - [`render`]: [`RendererBuilder`] (setup phase) and [`Renderer`] (serving phase)
//! - [`funcs`]: the function library injected into every compiled template set
//! - [`web`]: axum handlers for the base path and domain pages (feature `web`)
//! - [`error`]: error taxonomy shared by the modules above
//!
//! # Example
//!
//! ```
//! use nsview::vfs::MemFs;
//! use nsview::RendererBuilder;
//!
//! let views = MemFs::new().with_file("views/quote.tmpl.html", "{{ data }}");
//!
//! let mut builder = RendererBuilder::new("quotes/quote.tmpl.html", "/");
//! builder.register_namespace("quotes", views, false)?;
//! let renderer = builder.build();
//!
//! let html = renderer.render_to_string("quotes/quote.tmpl.html", &"hello")?;
//! assert_eq!(html, "hello");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod funcs;
pub mod globals;
pub mod render;
pub mod vfs;
#[cfg(feature = "web")]
pub mod web;

pub use error::{ErrorKind, GlobalError, RenderError, VfsError};
pub use globals::GlobalStore;
pub use render::{Renderer, RendererBuilder, TEMPLATE_GLOB, VIEW_SUBDIRECTORY};
