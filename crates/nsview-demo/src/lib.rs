//! # nsview demo
//!
//! Two independently developed domains composed into one site:
//!
//! - `app` (global): layout, navigation, index and not-found pages
//! - `quotes` (private): a random quote at `<base>/quote`, rendered inside the
//!   `app` layout
//!
//! Setup is two-phase like the renderer itself: every domain registers its
//! views on the [`RendererBuilder`], then the built [`Renderer`] is handed to
//! the domains that serve pages of their own.

pub mod config;
pub mod domains;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use nsview::web::base_path_handler;
use nsview::{Renderer, RendererBuilder};
use tower_http::trace::TraceLayer;

pub use config::DemoConfig;

/// Register every domain and freeze the renderer.
pub fn build_renderer(config: &DemoConfig) -> anyhow::Result<Arc<Renderer>> {
    let mut builder = RendererBuilder::new(domains::app::INDEX_TEMPLATE, &config.base_path);

    domains::app::register(&mut builder, &config.views_root).context("add app templates")?;
    domains::quotes::register(&mut builder, &config.views_root)
        .context("add quotes templates")?;

    for (key, value) in &config.globals {
        builder
            .set_global(key, value)
            .with_context(|| format!("set global {key:?}"))?;
    }

    Ok(Arc::new(builder.build()))
}

/// Base path and not-found handling plus every domain's routes.
pub fn router(renderer: Arc<Renderer>) -> Router {
    let handler = base_path_handler(Arc::clone(&renderer));
    Router::new()
        .merge(domains::quotes::routes(Arc::clone(&renderer)))
        .route(renderer.base_path(), handler.clone())
        .fallback_service(handler)
        .layer(TraceLayer::new_for_http())
}
