use std::sync::atomic::{AtomicBool, Ordering};

use server::entity::access::Scope;
use server::error::AppError;
use server::utils::authorization::{authenticate, is_admin, list_for, require_read_access};

use crate::common::TestApp;

#[tokio::test]
async fn route_gating_follows_the_token_scopes() {
    let app = TestApp::spawn().await;
    let (id, _) = app.create_access("camera_1", Scope::Admin).await;

    // The stored scope is admin but this token only grants user.
    let token = app.tokens.issue_access_token(id, &[Scope::User]).unwrap();

    let access = authenticate(&app.db, &app.tokens, &token, &[Scope::Admin, Scope::User])
        .await
        .unwrap();
    assert_eq!(access.id, id);

    let err = authenticate(&app.db, &app.tokens, &token, &[Scope::Admin])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ScopeMismatch));
}

#[tokio::test]
async fn visibility_follows_the_stored_scope() {
    let app = TestApp::spawn().await;
    let (user_id, _) = app.create_access("JohnDoe", Scope::User).await;

    assert!(is_admin(&app.db, 1).await.unwrap());
    assert!(!is_admin(&app.db, user_id).await.unwrap());

    assert!(require_read_access(&app.db, 1).await.is_ok());
    assert!(matches!(
        require_read_access(&app.db, user_id).await,
        Err(AppError::ReadForbidden)
    ));
}

#[tokio::test]
async fn list_filter_never_fetches_for_non_admins() {
    let app = TestApp::spawn().await;
    let (user_id, _) = app.create_access("JohnDoe", Scope::User).await;

    let fetched = AtomicBool::new(false);
    let fetch = || async {
        fetched.store(true, Ordering::SeqCst);
        Ok::<_, AppError>(vec![1, 2, 3])
    };

    let hidden = list_for(&app.db, user_id, fetch).await.unwrap();
    assert!(hidden.is_empty());
    assert!(!fetched.load(Ordering::SeqCst));

    let visible = list_for(&app.db, 1, fetch).await.unwrap();
    assert_eq!(visible, [1, 2, 3]);
    assert!(fetched.load(Ordering::SeqCst));
}

#[tokio::test]
async fn empty_token_scopes_match_no_route() {
    let app = TestApp::spawn().await;

    let token = app.tokens.issue_access_token(1, &[]).unwrap();

    let err = authenticate(&app.db, &app.tokens, &token, &[Scope::Admin, Scope::User])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ScopeMismatch));
}
