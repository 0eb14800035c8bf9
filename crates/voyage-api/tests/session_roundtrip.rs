use std::net::SocketAddr;

use voyage_api::middleware::auth::{Account, AppState};
use voyage_session::{
    ApiClient, ApiError, CookieStore, KeyValueStore, SessionConfig, SessionContext, Surface,
};
use voyage_types::{AuthUser, UserRole};

fn traveller() -> Account {
    Account {
        email: "mara@voyage.test".to_string(),
        password: "sunny-lisbon".to_string(),
        token: "mara-token".to_string(),
        user: AuthUser {
            id: "31".to_string(),
            name: "Mara".to_string(),
            email: "mara@voyage.test".to_string(),
            role: UserRole::Customer,
            phone: None,
            referral_code: Some("MARA-7Q".to_string()),
        },
    }
}

async fn spawn_backend() -> SocketAddr {
    let app = voyage_api::api_router(AppState::new(vec![traveller()]));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    let config = SessionConfig::for_surface(Surface::Storefront)
        .with_backend_url(format!("http://{addr}/api/v1"));
    ApiClient::from_session(SessionContext::in_memory(config))
}

#[tokio::test]
async fn login_then_rehydrate_uses_bearer_token() {
    let addr = spawn_backend().await;
    let client = client_for(addr);

    let user = client.login("mara@voyage.test", "sunny-lisbon").await.unwrap();
    assert_eq!(user.id, "31");

    client.session().set_user(None);
    let restored = client.rehydrate().await.unwrap();
    assert_eq!(restored.map(|u| u.name), Some("Mara".to_string()));
}

#[tokio::test]
async fn stale_local_token_recovers_through_cookie() {
    let addr = spawn_backend().await;
    let client = client_for(addr);
    let storage = client.session().storage().clone();
    storage.local.set("token", "revoked").unwrap();
    storage.cookies.set_cookie("token", "mara-token").unwrap();

    let profile = client.fetch_profile().await.unwrap();

    assert_eq!(profile.referral_code.as_deref(), Some("MARA-7Q"));
    assert_eq!(client.session().cleanup_runs(), 0);
}

#[tokio::test]
async fn rejected_everywhere_clears_session_once() {
    let addr = spawn_backend().await;
    let client = client_for(addr);
    let storage = client.session().storage().clone();
    storage.local.set("token", "revoked").unwrap();
    storage.session.set("token", "revoked").unwrap();

    let err = client.fetch_profile().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(err.user_message(), "unauthorized");
    assert_eq!(client.session().cleanup_runs(), 1);
    assert_eq!(client.session().token(), None);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(addr);
    client.session().storage().local.set("token", "mara-token").unwrap();

    let err = client.fetch_profile().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(client.session().cleanup_runs(), 0);
}
