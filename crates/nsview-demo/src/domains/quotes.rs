//! The `quotes` domain: a private namespace serving one random quote per
//! request at `<base>/quote`.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use nsview::vfs::DirFs;
use nsview::web::render_response;
use nsview::{Renderer, RendererBuilder, VfsError};

use super::page_path;

pub const NAMESPACE: &str = "quotes";
pub const QUOTE_TEMPLATE: &str = "quotes/quote.tmpl.html";

pub const QUOTES: &[&str] = &[
    "The sky is not a ceiling. It is the room you have not walked into yet.",
    "A wing is only a promise until the wind agrees to it.",
    "Every height looks impossible from the ground and ordinary from the air.",
    "Practice the landing. Anyone can leave the cliff.",
    "The flock remembers where the food was. The flyer remembers where the wind was.",
    "Speed is not the number on the dial. It is how little is left between you and there.",
];

pub fn register(builder: &mut RendererBuilder, views_root: &Path) -> Result<(), VfsError> {
    builder.register_namespace(NAMESPACE, DirFs::new(views_root.join(NAMESPACE)), false)
}

/// Routes served by this domain, mounted under the renderer's base path.
pub fn routes(renderer: Arc<Renderer>) -> Router {
    let path = page_path(renderer.base_path(), "quote");
    Router::new()
        .route(&path, get(quote_page))
        .with_state(renderer)
}

async fn quote_page(State(renderer): State<Arc<Renderer>>) -> Response {
    let quote = QUOTES[fastrand::usize(..QUOTES.len())];
    tracing::info!("Quote request");
    render_response(&renderer, QUOTE_TEMPLATE, quote).await
}
