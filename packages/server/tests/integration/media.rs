use chrono::{DateTime, Utc};
use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn admin_creates_and_reads_media() {
    let app = TestApp::spawn().await;
    let before = Utc::now();

    let res = app
        .post_with_token(routes::MEDIA, &json!({"type": "video"}), &app.admin_token)
        .await;
    let after = Utc::now();

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["type"], "video");
    assert!(res.body.get("bucket_key").is_none());
    let created_at: DateTime<Utc> = res.body["created_at"].as_str().unwrap().parse().unwrap();
    assert!(before <= created_at && created_at <= after);

    let fetched = app.get_with_token(&routes::media(res.id()), &app.admin_token).await;
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body["id"], res.body["id"]);
    assert_eq!(fetched.body["type"], "video");
}

#[tokio::test]
async fn media_type_defaults_to_image() {
    let app = TestApp::spawn().await;

    let res = app.post_with_token(routes::MEDIA, &json!({}), &app.admin_token).await;

    assert_eq!(res.status, 201);
    assert_eq!(res.body["type"], "image");
}

#[tokio::test]
async fn unknown_media_type_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_with_token(routes::MEDIA, &json!({"type": "hologram"}), &app.admin_token)
        .await;

    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn user_scope_cannot_create_media() {
    let app = TestApp::spawn().await;
    let (_, token) = app.user().await;

    let res = app.post_with_token(routes::MEDIA, &json!({"type": "image"}), &token).await;

    assert_eq!(res.status, 403);
    assert_eq!(
        res.body["detail"],
        "Your access scope is not compatible with this operation."
    );
}

#[tokio::test]
async fn user_cannot_read_a_single_media() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;
    let (_, token) = app.user().await;

    let res = app.get_with_token(&routes::media(id), &token).await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["detail"], "This access can't read resources");
}

#[tokio::test]
async fn listing_is_filtered_by_visibility() {
    let app = TestApp::spawn().await;
    let first = app.create_media("image").await;
    let second = app.create_media("video").await;
    let (_, token) = app.user().await;

    let as_user = app.get_with_token(routes::MEDIA, &token).await;
    assert_eq!(as_user.status, 200);
    assert_eq!(as_user.body, json!([]));

    let as_admin = app.get_with_token(routes::MEDIA, &app.admin_token).await;
    assert_eq!(as_admin.status, 200);
    let ids: Vec<i64> = as_admin
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [first as i64, second as i64]);
}

#[tokio::test]
async fn admin_updates_media_type() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;

    let res = app
        .put_with_token(&routes::media(id), &json!({"type": "video"}), &app.admin_token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["type"], "video");
    assert_eq!(res.body["id"], id);
}

#[tokio::test]
async fn admin_deletes_media() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;

    let res = app.delete_with_token(&routes::media(id), &app.admin_token).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["id"], id);

    let res = app.get_with_token(&routes::media(id), &app.admin_token).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn annotated_media_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;
    app.create_annotation(id).await;

    let res = app.delete_with_token(&routes::media(id), &app.admin_token).await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn unknown_media_is_not_found_everywhere() {
    let app = TestApp::spawn().await;
    let detail = "Table media has no entry with id=999";

    let get = app.get_with_token(&routes::media(999), &app.admin_token).await;
    let put = app
        .put_with_token(&routes::media(999), &json!({"type": "image"}), &app.admin_token)
        .await;
    let delete = app.delete_with_token(&routes::media(999), &app.admin_token).await;

    for res in [get, put, delete] {
        assert_eq!(res.status, 404);
        assert_eq!(res.body["detail"], detail);
    }
}

#[tokio::test]
async fn zero_id_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let res = app.get_with_token(&routes::media(0), &app.admin_token).await;

    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn url_of_never_uploaded_media_is_not_found() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;

    let res = app.get_with_token(&routes::media_url(id), &app.admin_token).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["detail"], "File cannot be found on the bucket storage");
}
