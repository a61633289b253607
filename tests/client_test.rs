//! API client tests
//!
//! Covers token attachment, the single re-login retry on 401, and how
//! non-auth failures surface.

use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::TempDir;
use wiltv::{ApiClient, ApiError, Credentials, SessionStore};

const CUSTOMER_BODY: &str = r#"{"data": {"id": 5, "name": "Ana Ruiz", "email": "ana@example.com"}}"#;
const LOGIN_BODY: &str = r#"{"token": "fresh-token", "customer": {"id": 5, "name": "Ana Ruiz"}}"#;

/// Store seeded with a stale token and replayable access code
fn seeded_store(dir: &TempDir) -> Arc<SessionStore> {
    let store = SessionStore::open(dir.path().join("session.json")).unwrap();
    store
        .update(|s| {
            s.auth_token = Some("stale-token".into());
            s.access_code = Some("4F7K2Q".into());
        })
        .unwrap();
    Arc::new(store)
}

// =============================================================================
// Retry on 401
// =============================================================================

#[tokio::test]
async fn test_401_relogs_in_and_retries_once() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = ApiClient::new(server.url(), seeded_store(&dir));

    let rejected = server
        .mock("GET", "/customer")
        .match_header("authorization", "Bearer stale-token")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let login = server
        .mock("POST", "/login/access-code")
        .match_body(Matcher::PartialJson(json!({"access_code": "4F7K2Q"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LOGIN_BODY)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/customer")
        .match_header("authorization", "Bearer fresh-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CUSTOMER_BODY)
        .expect(1)
        .create_async()
        .await;

    let customer = client.customer().await.unwrap();
    assert_eq!(customer.id, 5);
    assert_eq!(customer.name.as_deref(), Some("Ana Ruiz"));

    rejected.assert_async().await;
    login.assert_async().await;
    accepted.assert_async().await;

    // New token is persisted, not just held in memory
    assert_eq!(client.session().token().as_deref(), Some("fresh-token"));
    let reopened = SessionStore::open(dir.path().join("session.json")).unwrap();
    assert_eq!(reopened.token().as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_failed_relogin_does_not_retry() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = ApiClient::new(server.url(), seeded_store(&dir));

    let rejected = server
        .mock("GET", "/customer")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let login = server
        .mock("POST", "/login/access-code")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Invalid access code"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client.customer().await.unwrap_err();
    assert!(matches!(err, ApiError::ReloginFailed(_)), "got {:?}", err);
    assert!(err.is_auth_failure());

    rejected.assert_async().await;
    login.assert_async().await;
    assert_eq!(client.session().token().as_deref(), Some("stale-token"));
}

#[tokio::test]
async fn test_401_without_credentials_is_unauthorized() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path().join("session.json")).unwrap();
    store.set_token("orphan-token").unwrap();
    let client = ApiClient::new(server.url(), Arc::new(store));

    let rejected = server
        .mock("GET", "/customer")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let login = server
        .mock("POST", Matcher::Regex("^/login".into()))
        .expect(0)
        .create_async()
        .await;

    let err = client.customer().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    rejected.assert_async().await;
    login.assert_async().await;
}

#[tokio::test]
async fn test_still_unauthorized_after_relogin() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = ApiClient::new(server.url(), seeded_store(&dir));

    let rejected = server
        .mock("GET", "/customer")
        .with_status(401)
        .expect(2)
        .create_async()
        .await;
    let login = server
        .mock("POST", "/login/access-code")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LOGIN_BODY)
        .expect(1)
        .create_async()
        .await;

    let err = client.customer().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    rejected.assert_async().await;
    login.assert_async().await;
}

#[tokio::test]
async fn test_channel_auth_relogs_in_on_401() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = ApiClient::new(server.url(), seeded_store(&dir));

    let body = json!({"socket_id": "1234.5678", "channel_name": "private-customer.5"});
    let rejected = server
        .mock("POST", "/broadcasting/auth")
        .match_header("authorization", "Bearer stale-token")
        .match_body(Matcher::Json(body.clone()))
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let _login = server
        .mock("POST", "/login/access-code")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LOGIN_BODY)
        .create_async()
        .await;
    let signed = server
        .mock("POST", "/broadcasting/auth")
        .match_header("authorization", "Bearer fresh-token")
        .match_body(Matcher::Json(body))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"auth": "app-key:5f2b9c"}"#)
        .expect(1)
        .create_async()
        .await;

    let auth = client
        .authorize_channel("1234.5678", "private-customer.5")
        .await
        .unwrap();
    assert_eq!(auth.auth, "app-key:5f2b9c");
    assert!(auth.channel_data.is_none());

    rejected.assert_async().await;
    signed.assert_async().await;
}

// =============================================================================
// Other failures
// =============================================================================

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = ApiClient::new(server.url(), seeded_store(&dir));

    let failing = server
        .mock("GET", "/customer")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let err = client.customer().await.unwrap_err();
    assert!(matches!(err, ApiError::Status(500)));
    assert!(!err.is_auth_failure());
    failing.assert_async().await;
}

#[tokio::test]
async fn test_missing_title_is_not_found() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = ApiClient::new(server.url(), seeded_store(&dir));

    let _mock = server
        .mock("GET", "/movies/999")
        .with_status(404)
        .create_async()
        .await;

    let err = client.movie(999).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test]
async fn test_null_item_is_empty_body() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let client = ApiClient::new(server.url(), seeded_store(&dir));

    let _mock = server
        .mock("GET", "/tv-shows/3")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": null}"#)
        .create_async()
        .await;

    let err = client.tv_show(3).await.unwrap_err();
    assert!(matches!(err, ApiError::EmptyBody));
}

#[tokio::test]
async fn test_unreachable_server_is_request_failure() {
    let dir = TempDir::new().unwrap();
    // Port 9 (discard) is closed on test hosts
    let client = ApiClient::new("http://127.0.0.1:9", seeded_store(&dir));

    let err = client.customer().await.unwrap_err();
    assert!(matches!(err, ApiError::RequestFailed(_)), "got {:?}", err);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_access_code_login_stores_session() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SessionStore::open(dir.path().join("session.json")).unwrap());
    store.ensure_device_identity("Living Room").unwrap();
    let client = ApiClient::new(server.url(), store.clone());

    let login = server
        .mock("POST", "/login/access-code")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "access_code": "4F7K2Q",
            "device_name": "Living Room",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LOGIN_BODY)
        .create_async()
        .await;

    let customer = client.login_with_access_code("4F7K2Q").await.unwrap();
    assert_eq!(customer.id, 5);
    login.assert_async().await;

    let session = store.snapshot();
    assert_eq!(session.auth_token.as_deref(), Some("fresh-token"));
    assert_eq!(session.access_code.as_deref(), Some("4F7K2Q"));
    assert_eq!(session.user_id.as_deref(), Some("5"));
    assert_eq!(session.customer_name.as_deref(), Some("Ana Ruiz"));
    assert!(session.device_mac_address.is_some());
}

#[tokio::test]
async fn test_password_login_rejected_with_message() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SessionStore::open(dir.path().join("session.json")).unwrap());
    let client = ApiClient::new(server.url(), store.clone());

    let _mock = server
        .mock("POST", "/login")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "These credentials do not match our records."}"#)
        .create_async()
        .await;

    let err = client
        .login_with_password("ana@example.com", "wrong")
        .await
        .unwrap_err();
    match err {
        ApiError::LoginRejected(message) => assert!(message.contains("do not match")),
        other => panic!("expected LoginRejected, got {:?}", other),
    }
    assert!(!store.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_password_login_replaces_stored_access_code() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SessionStore::open(dir.path().join("session.json")).unwrap());
    store
        .update(|s| s.access_code = Some("REVOKED".into()))
        .unwrap();
    let client = ApiClient::new(server.url(), store.clone());

    let _mock = server
        .mock("POST", "/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LOGIN_BODY)
        .create_async()
        .await;

    client
        .login_with_password("ana@example.com", "pw")
        .await
        .unwrap();

    assert!(store.snapshot().access_code.is_none());
    assert_eq!(
        store.credentials(),
        Some(Credentials::Password {
            email: "ana@example.com".into(),
            password: "pw".into(),
        })
    );
}

// =============================================================================
// Customer switch
// =============================================================================

#[tokio::test]
async fn test_token_for_customer_persists_token() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);
    store
        .update(|s| s.device_mac_address = Some("device-1".into()))
        .unwrap();
    let client = ApiClient::new(server.url(), store);

    let exchange = server
        .mock("POST", "/token-for-customer")
        .match_header("authorization", "Bearer stale-token")
        .match_body(Matcher::Json(json!({
            "customer_id": 17,
            "mac_address": "device-1",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token": "customer-17-token"}"#)
        .expect(1)
        .create_async()
        .await;

    let token = client.token_for_customer(17).await.unwrap();
    assert_eq!(token, "customer-17-token");
    exchange.assert_async().await;

    let reopened = SessionStore::open(dir.path().join("session.json")).unwrap();
    assert_eq!(reopened.token().as_deref(), Some("customer-17-token"));
}
