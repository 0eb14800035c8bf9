pub mod user;

use axum::Router;

use crate::middleware::auth::AppState;

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new().merge(user::routes(state))
}
