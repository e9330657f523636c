//! CORS middleware configuration.

use axum::http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Create a CORS layer from the configured origins.
///
/// An empty list, or a list with no parseable origin, allows any origin.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([ACCEPT, CONTENT_TYPE, CONTENT_LENGTH]);

    match allowed_origins(origins) {
        Some(origins) => layer.allow_origin(AllowOrigin::list(origins)),
        None => layer.allow_origin(Any),
    }
}

fn allowed_origins(origins: &[String]) -> Option<Vec<HeaderValue>> {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_empty() {
        assert!(allowed_origins(&[]).is_none());
        let _layer = create_cors_layer(&[]);
    }

    #[test]
    fn test_allowed_origins_with_values() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
        ];
        assert_eq!(allowed_origins(&origins).map(|o| o.len()), Some(2));
        let _layer = create_cors_layer(&origins);
    }

    #[test]
    fn test_allowed_origins_skips_invalid() {
        let origins = vec!["bad\norigin".to_string(), "http://localhost:3000".to_string()];
        assert_eq!(allowed_origins(&origins).map(|o| o.len()), Some(1));

        let only_invalid = vec!["bad\norigin".to_string()];
        assert!(allowed_origins(&only_invalid).is_none());
    }
}
