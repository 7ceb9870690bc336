use doorstep_kernel::server::error::PageError;
use doorstep_kernel::server::{csrf, flash};
use std::sync::Arc;
use tower_sessions::{MemoryStore, Session};

fn fresh_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

#[tokio::test]
async fn csrf_token_is_stable_per_session_and_verifies() {
    let session = fresh_session();

    let token = csrf::issue(&session).await.expect("issue");
    assert_eq!(token.len(), 32);

    let again = csrf::issue(&session).await.expect("re-issue");
    assert_eq!(token, again, "issuing twice must not rotate the token");

    csrf::verify(&session, Some(&token)).await.expect("matching token verifies");
}

#[tokio::test]
async fn csrf_mismatch_and_absence_are_rejected() {
    let session = fresh_session();
    let _token = csrf::issue(&session).await.expect("issue");

    let err = csrf::verify(&session, Some("forged")).await.expect_err("forged token");
    assert!(matches!(err, PageError::Csrf { .. }));

    let err = csrf::verify(&session, None).await.expect_err("missing field");
    assert!(matches!(err, PageError::Csrf { .. }));
}

#[tokio::test]
async fn csrf_verify_without_issued_token_is_rejected() {
    let session = fresh_session();

    let err = csrf::verify(&session, Some("anything")).await.expect_err("no session token");
    assert!(matches!(err, PageError::Csrf { .. }));
}

#[tokio::test]
async fn flash_notices_are_one_shot() {
    let session = fresh_session();

    flash::push(&session, "Your new settings has been updated!").await.expect("push");

    let notices = flash::take(&session).await.expect("take");
    assert_eq!(notices, vec!["Your new settings has been updated!"]);

    let empty = flash::take(&session).await.expect("second take");
    assert!(empty.is_empty(), "flash notices must not survive a second read");
}
