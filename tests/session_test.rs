//! Session store tests: persistence, logout, change notification.

use tempfile::TempDir;
use wiltv::{Credentials, Customer, SessionError, SessionStore};

fn customer() -> Customer {
    Customer {
        id: 42,
        name: Some("Ana Ruiz".into()),
        email: Some("ana@example.com".into()),
        access_code: None,
        profile_photo: Some("/photos/42.png".into()),
    }
}

#[test]
fn test_missing_file_is_empty_session() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path().join("session.json")).unwrap();

    assert!(!store.snapshot().is_authenticated());
    assert!(store.token().is_none());
    assert!(store.credentials().is_none());
}

#[test]
fn test_login_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    {
        let store = SessionStore::open(&path).unwrap();
        store
            .save_login(
                "tok-1",
                &customer(),
                Some(Credentials::Password {
                    email: "ana@example.com".into(),
                    password: "hunter2".into(),
                }),
            )
            .unwrap();
    }

    let store = SessionStore::open(&path).unwrap();
    let session = store.snapshot();
    assert_eq!(session.auth_token.as_deref(), Some("tok-1"));
    assert_eq!(session.user_id.as_deref(), Some("42"));
    assert_eq!(session.customer_name.as_deref(), Some("Ana Ruiz"));
    assert_eq!(session.profile_photo_path.as_deref(), Some("/photos/42.png"));
    assert_eq!(
        store.credentials(),
        Some(Credentials::Password {
            email: "ana@example.com".into(),
            password: "hunter2".into()
        })
    );
}

#[test]
fn test_login_keeps_only_the_method_used() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path().join("session.json")).unwrap();

    store
        .save_login("tok-1", &customer(), Some(Credentials::AccessCode("OLD1".into())))
        .unwrap();
    store
        .save_login(
            "tok-2",
            &customer(),
            Some(Credentials::Password {
                email: "ana@example.com".into(),
                password: "hunter2".into(),
            }),
        )
        .unwrap();
    assert!(store.snapshot().access_code.is_none());
    assert!(matches!(store.credentials(), Some(Credentials::Password { .. })));

    store
        .save_login("tok-3", &customer(), Some(Credentials::AccessCode("NEW2".into())))
        .unwrap();
    assert!(store.snapshot().password.is_none());
    assert_eq!(store.credentials(), Some(Credentials::AccessCode("NEW2".into())));
}

#[test]
fn test_logout_clears_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let store = SessionStore::open(&path).unwrap();

    store.ensure_device_identity("Den TV").unwrap();
    store
        .save_login("tok-1", &customer(), Some(Credentials::AccessCode("ZX81".into())))
        .unwrap();
    assert!(path.exists());

    store.logout().unwrap();

    assert!(store.token().is_none());
    assert!(store.credentials().is_none());
    assert_eq!(store.snapshot(), Default::default());
    assert!(!path.exists());

    // Logging out twice is harmless
    store.logout().unwrap();
}

#[test]
fn test_device_identity_is_stable() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path().join("session.json")).unwrap();

    let first = store.ensure_device_identity("Den TV").unwrap();
    let second = store.ensure_device_identity("Other Name").unwrap();

    assert!(first.device_mac_address.is_some());
    assert_eq!(first.device_mac_address, second.device_mac_address);
    assert_eq!(second.device_name.as_deref(), Some("Den TV"));
}

#[test]
fn test_corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = SessionStore::open(&path).unwrap_err();
    assert!(matches!(err, SessionError::Corrupt(_)));
}

#[tokio::test]
async fn test_subscribers_see_login_and_logout() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path().join("session.json")).unwrap();
    let mut rx = store.subscribe();

    store.save_login("tok-9", &customer(), None).unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().auth_token.as_deref(), Some("tok-9"));

    store.logout().unwrap();
    rx.changed().await.unwrap();
    assert!(!rx.borrow_and_update().is_authenticated());
}
