use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use voyage_api::middleware::auth::{Account, AppState};
use voyage_types::{AuthUser, UserRole};

fn test_accounts() -> Vec<Account> {
    vec![Account {
        email: "ops@voyage.test".to_string(),
        password: "letmein".to_string(),
        token: "admin-token".to_string(),
        user: AuthUser {
            id: "1".to_string(),
            name: "Ops".to_string(),
            email: "ops@voyage.test".to_string(),
            role: UserRole::Admin,
            phone: None,
            referral_code: None,
        },
    }]
}

fn test_router() -> Router {
    voyage_api::api_router(AppState::new(test_accounts()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_login_sets_token_cookie() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"email":"OPS@voyage.test","password":"letmein"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token=admin-token;"));

    let body = body_json(response).await;
    assert_eq!(body["token"], "admin-token");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"ops@voyage.test","password":"nope"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid credentials");
}

#[tokio::test]
async fn test_profile_with_bearer() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/user/profile")
                .header(header::AUTHORIZATION, "Bearer admin-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], "ops@voyage.test");
}

#[tokio::test]
async fn test_profile_with_cookie_only() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/user/profile")
                .header(header::COOKIE, "currency=EUR; token=admin-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bearer_takes_precedence_over_cookie() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/user/profile")
                .header(header::AUTHORIZATION, "Bearer expired")
                .header(header::COOKIE, "token=admin-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");
}

#[tokio::test]
async fn test_profile_without_credentials() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/user/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response.headers().get(header::SET_COOKIE).unwrap();
    assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
}

#[test]
fn test_cors_layer_requires_valid_origins() {
    assert!(voyage_api::cors_layer(&[]).is_none());
    assert!(voyage_api::cors_layer(&["bad\norigin".to_string()]).is_none());
    assert!(voyage_api::cors_layer(&["https://admin.voyage.test".to_string()]).is_some());
}
