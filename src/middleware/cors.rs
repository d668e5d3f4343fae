use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Any origin may call the API; PDF downloads need `Content-Disposition`
/// readable from scripts.
pub fn api_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_origin(Any)
        .expose_headers([header::CONTENT_DISPOSITION])
}
