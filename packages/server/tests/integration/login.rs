use serde_json::json;

use crate::common::{SUPERUSER_LOGIN, SUPERUSER_PASSWORD, TestApp, routes};

#[tokio::test]
async fn superuser_can_log_in_and_use_the_token() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(
            routes::LOGIN,
            &[("username", SUPERUSER_LOGIN), ("password", SUPERUSER_PASSWORD)],
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["token_type"], "bearer");
    let token = res.body["access_token"].as_str().unwrap();

    let me = app.get_with_token(routes::ACCESSES, token).await;
    assert_eq!(me.status, 200);
    assert_eq!(me.body[0]["login"], SUPERUSER_LOGIN);
    assert_eq!(me.body[0]["scope"], "admin");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(routes::LOGIN, &[("username", SUPERUSER_LOGIN), ("password", "nope")])
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    assert_eq!(res.headers["www-authenticate"], "Bearer");
}

#[tokio::test]
async fn unknown_login_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(routes::LOGIN, &[("username", "ghost"), ("password", "whatever")])
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn missing_form_field_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let res = app.post_form(routes::LOGIN, &[("username", SUPERUSER_LOGIN)]).await;

    assert_eq!(res.status, 422);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn request_without_token_is_not_authenticated() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::MEDIA).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["detail"], "Not authenticated");
    assert_eq!(res.headers["www-authenticate"], "Bearer");
}

#[tokio::test]
async fn forged_token_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get_with_token(routes::MEDIA, "my_false_token").await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn token_for_a_deleted_access_is_unprocessable() {
    let app = TestApp::spawn().await;
    let token = app
        .tokens
        .issue_access_token(999, &[server::entity::access::Scope::Admin])
        .unwrap();

    let res = app.get_with_token(routes::MEDIA, &token).await;

    assert_eq!(res.status, 422);
    assert_eq!(
        res.body["detail"],
        "Token payload refers to a nonexistent access."
    );
}

#[tokio::test]
async fn health_probe_needs_no_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"status": "ok"}));
    assert!(res.headers.contains_key("x-process-time"));
}
