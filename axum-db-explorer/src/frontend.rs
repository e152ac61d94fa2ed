//! Embedded static asset serving
//!
//! The stylesheet and browser script shipped with the crate are embedded at
//! compile time and served with long-term caching and guessed MIME types.

use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::Response,
};
use include_dir::{include_dir, Dir};

// Embed the assets directory at compile time
static ASSETS: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Handler for GET /assets/{*path}
///
/// Serves files from the embedded assets directory with appropriate content
/// types. Assets are versioned with the crate, so long-term caching is safe.
pub async fn serve_static_asset(Path(path): Path<String>) -> Response {
    match ASSETS.get_file(&path) {
        Some(file) => {
            let mime_type = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .to_string();

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime_type)
                .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
                .body(Body::from(file.contents()))
                .unwrap()
        }
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from(format!("Asset not found: {path}")))
            .unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_assets_are_present() {
        assert!(ASSETS.get_file("style.css").is_some());
        assert!(ASSETS.get_file("app.js").is_some());
    }

    #[test]
    fn test_mime_type_guessing() {
        use mime_guess::from_path;

        let javascript_mime = from_path("app.js").first_or_octet_stream();
        assert_eq!(javascript_mime.as_ref(), "text/javascript");

        let css_mime = from_path("style.css").first_or_octet_stream();
        assert_eq!(css_mime.as_ref(), "text/css");
    }

    #[tokio::test]
    async fn unknown_assets_are_404() {
        let response = serve_static_asset(Path("missing.js".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stylesheet_is_served_with_cache_headers() {
        let response = serve_static_asset(Path("style.css".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css"
        );
        assert!(response
            .headers()
            .get(header::CACHE_CONTROL)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("immutable"));
    }
}
