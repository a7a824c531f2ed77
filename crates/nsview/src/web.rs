//! # HTTP Adapter
//!
//! Handler-producing entry points for an axum router. Routing stays with the
//! caller:
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use nsview::web::base_path_handler;
//! # fn app(renderer: Arc<nsview::Renderer>) -> Router {
//! let handler = base_path_handler(Arc::clone(&renderer));
//! Router::new()
//!     .route(renderer.base_path(), handler.clone())
//!     .fallback_service(handler)
//! # }
//! ```
//!
//! Renders run on the blocking pool and are buffered, so a failed render
//! never reaches the client half-written. Failures map to statuses by kind:
//! unknown namespace → 404, cancelled → 503, anything else → 500.

use std::sync::Arc;

use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, MethodRouter};
use serde::Serialize;
use tera::Value;
use tracing::{debug, error};

use crate::error::{ErrorKind, RenderError};
use crate::render::Renderer;

/// Handler for the base path and every unmatched path.
///
/// A request for exactly the base path renders the root template with null
/// data; any other path renders the not-found template with the request path
/// as data. A successful not-found render answers 200, like any page.
pub fn base_path_handler(renderer: Arc<Renderer>) -> MethodRouter {
    any(move |uri: Uri| {
        let renderer = Arc::clone(&renderer);
        async move { serve_base_path(renderer, uri).await }
    })
}

async fn serve_base_path(renderer: Arc<Renderer>, uri: Uri) -> Response {
    let path = uri.path();
    if path == renderer.base_path() {
        let root = renderer.root_template().to_string();
        return render_response(&renderer, &root, Value::Null).await;
    }

    match renderer.not_found_template() {
        Some(template) => {
            let template = template.to_string();
            render_response(&renderer, &template, Value::String(path.to_string())).await
        }
        None => {
            debug!(%path, "No not-found template designated");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Render `name` with `data` as a `200 text/html` response.
pub async fn render_response<T>(renderer: &Arc<Renderer>, name: &str, data: T) -> Response
where
    T: Serialize + Send + 'static,
{
    let renderer = Arc::clone(renderer);
    let page = name.to_string();
    let result = tokio::task::spawn_blocking(move || {
        let mut body = Vec::new();
        renderer.render(&mut body, &page, &data).map(|()| body)
    })
    .await;

    match result {
        Ok(Ok(body)) => Html(body).into_response(),
        Ok(Err(e)) => {
            error!(page = %name, kind = ?e.kind(), error = %e, "render page");
            status_for(&e).into_response()
        }
        Err(e) => {
            error!(page = %name, error = %e, "render task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Response status for a failed render.
pub fn status_for(err: &RenderError) -> StatusCode {
    match err.kind() {
        ErrorKind::NamespaceNotFound => StatusCode::NOT_FOUND,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::PathFormat
        | ErrorKind::Filesystem
        | ErrorKind::Parse
        | ErrorKind::Execute => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
