use axum::{middleware, routing::get, Extension, Json, Router};
use voyage_types::AuthUser;

use crate::middleware::auth::{require_api_auth, AppState};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/user/profile", get(get_profile))
        .route_layer(middleware::from_fn_with_state(state, require_api_auth))
}

async fn get_profile(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}
