use chrono::Duration;
use std::sync::Arc;
use tasksync::backend::auth::{mint_custom_token, AuthProvider, LocalAuthProvider};
use tasksync::session::IdentitySession;
use tempfile::TempDir;

const SECRET: &str = "test-secret";

fn provider() -> (TempDir, Arc<LocalAuthProvider>) {
    let dir = tempfile::tempdir().unwrap();
    let auth = LocalAuthProvider::open(dir.path().join("auth.json"), SECRET).unwrap();
    (dir, Arc::new(auth))
}

#[tokio::test]
async fn test_anonymous_sign_in_without_identity_or_token() {
    let (_dir, auth) = provider();
    let mut session = IdentitySession::start(auth.clone(), None);
    let state = session.settled().await;

    assert!(state.ready);
    assert!(!state.sign_in_failed);
    let user = state.user.clone().unwrap();
    assert!(user.is_anonymous);
    assert!(!user.uid.is_empty());
    assert_eq!(auth.current_user(), Some(user));
}

#[tokio::test]
async fn test_custom_token_sign_in() {
    let (_dir, auth) = provider();
    let token = mint_custom_token(SECRET, "alice", Duration::hours(1)).unwrap();
    let mut session = IdentitySession::start(auth.clone(), Some(token));
    let state = session.settled().await;

    assert!(state.ready);
    let user = state.active_user().unwrap();
    assert_eq!(user.uid, "alice");
    assert!(!user.is_anonymous);
}

#[tokio::test]
async fn test_existing_identity_is_reused() {
    let (_dir, auth) = provider();
    let existing = auth.sign_in_anonymously().await.unwrap();

    // The token is ignored because an identity is already present.
    let token = mint_custom_token(SECRET, "alice", Duration::hours(1)).unwrap();
    let mut session = IdentitySession::start(auth.clone(), Some(token));
    let state = session.settled().await;

    assert_eq!(state.user, Some(existing));
}

#[tokio::test]
async fn test_identity_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("auth.json");
    let first = {
        let auth = Arc::new(LocalAuthProvider::open(&file, SECRET).unwrap());
        let mut session = IdentitySession::start(auth, None);
        session.settled().await.user.unwrap()
    };

    let auth = LocalAuthProvider::open(&file, SECRET).unwrap();
    assert_eq!(auth.current_user(), Some(first));
}

#[tokio::test]
async fn test_bad_token_leaves_session_not_ready() {
    let (_dir, auth) = provider();
    let token = mint_custom_token("some-other-secret", "mallory", Duration::hours(1)).unwrap();
    let mut session = IdentitySession::start(auth.clone(), Some(token));
    let state = session.settled().await;

    assert!(!state.ready);
    assert!(state.sign_in_failed);
    assert_eq!(state.user, None);
    assert_eq!(state.active_user(), None);
    assert_eq!(auth.current_user(), None);
}

#[tokio::test]
async fn test_sign_out_leads_to_a_new_identity() {
    let (_dir, auth) = provider();
    let mut session = IdentitySession::start(auth.clone(), None);
    let first = session.settled().await.user.unwrap();

    auth.sign_out().await.unwrap();
    let mut rx = session.watch();
    let state = rx
        .wait_for(|s| s.user.as_ref().is_some_and(|u| u.uid != first.uid))
        .await
        .unwrap()
        .clone();
    assert!(state.ready);
}

#[tokio::test]
async fn test_dropped_session_stops_listening() {
    let (_dir, auth) = provider();
    let mut session = IdentitySession::start(auth.clone(), None);
    assert!(session.settled().await.ready);
    drop(session);
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    auth.sign_out().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    // A live listener would have signed in again.
    assert_eq!(auth.current_user(), None);
}
