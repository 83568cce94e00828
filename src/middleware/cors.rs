use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

/// Restricts browsers to the portal's own origin when one is configured.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => {
            tracing::warn!("CORS_ORIGIN not set, allowing any origin");
            layer.allow_origin(Any)
        }
    }
}
