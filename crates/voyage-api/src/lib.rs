#![allow(non_snake_case)]

pub mod middleware;
pub mod routes;

use axum::Router;

use crate::middleware::auth::AppState;

pub fn api_router(state: AppState) -> Router {
    let apiRoutes = routes::api_routes(state.clone());
    let authRoutes = middleware::auth::auth_routes(state.clone());

    Router::new()
        .merge(apiRoutes)
        .merge(authRoutes)
        .with_state(state)
}

/// CORS for storefront/admin origins served from another host. Credentials
/// are allowed, so origins must be listed explicitly.
pub fn cors_layer(origins: &[String]) -> Option<tower_http::cors::CorsLayer> {
    use axum::http::{header, HeaderValue, Method};
    use tower_http::cors::CorsLayer;

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("ignoring invalid cors origin {origin}: {e}");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT_LANGUAGE]),
    )
}
