//! Embedded chat page served from the binary

use axum::extract::Path;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "static/"]
struct ChatAssets;

/// Serve the chat page
pub async fn index_handler() -> impl IntoResponse {
    match ChatAssets::get("index.html") {
        Some(content) => Html(content.data.to_vec()).into_response(),
        None => (StatusCode::NOT_FOUND, "Chat page missing from build").into_response(),
    }
}

/// Serve the page's scripts and styles
pub async fn static_handler(Path(path): Path<String>) -> impl IntoResponse {
    let key = format!("assets/{}", path);
    match ChatAssets::get(&key) {
        Some(content) => {
            let mime = mime_guess::from_path(&key).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CACHE_CONTROL, "no-cache".to_string()),
                ],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
