use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use voyage_types::{AuthUser, ErrorBody, LoginRequest, LoginResponse, SessionToken, TOKEN_KEY};

/// One login the API accepts, loaded from config.
#[derive(Deserialize, Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub token: String,
    pub user: AuthUser,
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<Vec<Account>>,
}

impl AppState {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Arc::new(accounts),
        }
    }

    fn by_token(&self, token: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.token == token)
    }

    fn by_credentials(&self, email: &str, password: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(email) && account.password == password)
    }
}

pub fn auth_routes(_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/login", post(handle_login))
        .route("/api/v1/auth/logout", post(handle_logout))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody::error(message))).into_response()
}

// Not HttpOnly: the browser client reads this cookie as its last-resort
// token source.
fn session_cookie(token: &str, maxAge: u64) -> HeaderValue {
    let cookieValue = format!("{TOKEN_KEY}={token}; SameSite=Lax; Path=/; Max-Age={maxAge}");
    HeaderValue::from_str(&cookieValue).unwrap_or_else(|_| HeaderValue::from_static(""))
}

async fn handle_login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    let Some(account) = state.by_credentials(&body.email, &body.password) else {
        tracing::info!(email = %body.email, "rejected login");
        return error_response(StatusCode::UNAUTHORIZED, "invalid credentials");
    };

    tracing::info!(user_id = %account.user.id, "login");
    let payload = LoginResponse {
        token: SessionToken(account.token.clone()),
        user: account.user.clone(),
    };

    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&account.token, 604800))],
        Json(payload),
    )
        .into_response()
}

async fn handle_logout() -> Response {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, session_cookie("", 0))],
    )
        .into_response()
}

/// Middleware for API routes: `Authorization: Bearer <token>` first, the
/// `token` cookie second. The matching user is put into request extensions.
pub async fn require_api_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    let cookieToken = CookieJar::from_headers(request.headers())
        .get(TOKEN_KEY)
        .map(|cookie| cookie.value().to_string());

    let account = match bearer {
        Some(token) => state.by_token(&token),
        None => cookieToken.as_deref().and_then(|token| state.by_token(token)),
    };

    let Some(account) = account else {
        return error_response(StatusCode::UNAUTHORIZED, "unauthorized");
    };

    request.extensions_mut().insert(account.user.clone());
    next.run(request).await
}
