//! Static asset routes for the chat UI.
//!
//! Serves the index page plus per-name script and stylesheet assets from the
//! configured asset root, with the fixed 404 HTML bodies on absence.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, warn};

use crate::server::chat_api::AppState;

const PAGE_NOT_FOUND: &str = "<h1>Page Not Found</h1>";
const FILE_NOT_FOUND: &str = "<h1>File Not Found</h1>";

/// GET /: the index page.
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Response {
    serve_file(&state.config.assets.root, "index.html", "text/html", PAGE_NOT_FOUND).await
}

/// GET /{asset}: per-name script and stylesheet assets.
///
/// Only `.js` and `.css` names resolve; anything else gets the 404 body, as
/// does a name that fails the containment check.
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path(asset): Path<String>,
) -> Response {
    if !is_contained(&asset) {
        warn!(asset, "Rejecting asset name outside the asset root");
        return not_found(FILE_NOT_FOUND);
    }

    let content_type = if asset.ends_with(".js") {
        "application/javascript"
    } else if asset.ends_with(".css") {
        "text/css"
    } else {
        return not_found(FILE_NOT_FOUND);
    };

    serve_file(&state.config.assets.root, &asset, content_type, FILE_NOT_FOUND).await
}

/// Asset names are single path components: the router only matches one
/// segment, but percent-decoding happens after matching, so an encoded
/// separator or parent reference must be rejected here before any path join.
fn is_contained(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

async fn serve_file(
    root: &FsPath,
    name: &str,
    content_type: &'static str,
    missing_body: &'static str,
) -> Response {
    let path = root.join(name);
    match tokio::fs::read(&path).await {
        Ok(contents) => {
            debug!(path = %path.display(), bytes = contents.len(), "Serving static asset");
            ([(header::CONTENT_TYPE, content_type)], contents).into_response()
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Static asset not readable");
            not_found(missing_body)
        }
    }
}

fn not_found(body: &'static str) -> Response {
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment_accepts_plain_names() {
        assert!(is_contained("app.js"));
        assert!(is_contained("styles.css"));
        assert!(is_contained("index.html"));
    }

    #[test]
    fn test_containment_rejects_traversal() {
        assert!(!is_contained(""));
        assert!(!is_contained("../secret.js"));
        assert!(!is_contained("..\\secret.js"));
        assert!(!is_contained("a/b.js"));
        assert!(!is_contained("..js"));
    }
}
