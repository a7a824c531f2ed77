//! Integration tests for the axum adapter: base path, not-found fallback and
//! domain pages, driven through `tower::ServiceExt::oneshot`.

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use nsview::vfs::MemFs;
use nsview::web::{base_path_handler, render_response};
use nsview::{Renderer, RendererBuilder};
use tower::ServiceExt;

fn renderer(base: &str, with_not_found: bool) -> Arc<Renderer> {
    let app = MemFs::new()
        .with_file(
            "views/index.html",
            "<a href=\"{{ global(key=\"basepath\") | trimSuffix(suffix=\"/\") }}/quote\">home</a>",
        )
        .with_file("views/notfound.html", "no page at {{ data }}");
    let quotes = MemFs::new()
        .with_file("views/quote.tmpl.html", "{{ data }}")
        .with_file("views/broken.html", "{{ data.missing.field }}");

    let mut builder = RendererBuilder::new("app/index.html", base);
    builder.register_namespace("app", app, true).unwrap();
    builder.register_namespace("quotes", quotes, false).unwrap();
    if with_not_found {
        builder.set_not_found("app/notfound.html");
    }
    Arc::new(builder.build())
}

fn router(renderer: Arc<Renderer>) -> Router {
    let handler = base_path_handler(Arc::clone(&renderer));

    let quote = Arc::clone(&renderer);
    let broken = Arc::clone(&renderer);
    let stray = Arc::clone(&renderer);
    let quote_path = join(renderer.base_path(), "quote");
    let broken_path = join(renderer.base_path(), "broken");
    let stray_path = join(renderer.base_path(), "stray");

    Router::new()
        .route(
            &quote_path,
            get(move || async move {
                render_response(&quote, "quotes/quote.tmpl.html", "hello").await
            }),
        )
        .route(
            &broken_path,
            get(move || async move { render_response(&broken, "quotes/broken.html", ()).await }),
        )
        .route(
            &stray_path,
            get(move || async move { render_response(&stray, "blog/post.html", ()).await }),
        )
        .route(renderer.base_path(), handler.clone())
        .fallback_service(handler)
}

fn join(base: &str, page: &str) -> String {
    format!("{}/{page}", base.trim_end_matches('/'))
}

async fn get_page(router: Router, uri: &str) -> (StatusCode, String, Option<String>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap(), content_type)
}

#[tokio::test]
async fn test_base_path_renders_root_template() {
    let (status, body, content_type) = get_page(router(renderer("/", true)), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<a href=\"/quote\">home</a>");
    assert!(content_type.unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn test_prefixed_base_path() {
    let (status, body, _) = get_page(router(renderer("/app", true)), "/app").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<a href=\"/app/quote\">home</a>");

    let (status, body, _) = get_page(router(renderer("/app", true)), "/app/quote").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello");
}

#[tokio::test]
async fn test_domain_page() {
    let (status, body, _) = get_page(router(renderer("/", true)), "/quote").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello");
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_template() {
    let (status, body, _) = get_page(router(renderer("/", true)), "/nowhere").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "no page at /nowhere");
}

#[tokio::test]
async fn test_unknown_path_without_not_found_template() {
    let (status, body, _) = get_page(router(renderer("/", false)), "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_execute_failure_is_500_with_empty_body() {
    let (status, body, _) = get_page(router(renderer("/", true)), "/broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unknown_namespace_is_404() {
    let (status, body, _) = get_page(router(renderer("/", true)), "/stray").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}
