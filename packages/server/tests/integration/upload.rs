use ::common::storage::{ContentHash, object_name, resolve_bucket_key};
use sea_orm::EntityTrait;

use server::entity::{annotation, media};

use crate::common::{ANNOTATIONS_FOLDER, MAX_UPLOAD_SIZE, MEDIA_FOLDER, TestApp, TestBucket, routes};

const FRAME: &[u8] = b"\xFF\xD8\xFF\xE0 smoke plume over the ridge";

fn expected_key(data: &[u8], file_name: &str, folder: &str) -> String {
    resolve_bucket_key(&object_name(&ContentHash::compute(data), file_name), Some(folder))
}

async fn media_key(app: &TestApp, id: i32) -> Option<String> {
    media::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .bucket_key
}

#[tokio::test]
async fn upload_stores_content_under_its_fingerprint() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;

    let res = app
        .upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &app.admin_token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["id"], id);

    let key = expected_key(FRAME, "frame.jpg", MEDIA_FOLDER);
    assert_eq!(media_key(&app, id).await.as_deref(), Some(key.as_str()));
    assert!(app.bucket.exists(&key).await.unwrap());
    let stored = app.bucket.download(&key).await.unwrap().read().await.unwrap();
    assert_eq!(stored, FRAME);
}

#[tokio::test]
async fn uploading_identical_content_twice_is_a_no_op() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;
    let key = expected_key(FRAME, "frame.jpg", MEDIA_FOLDER);

    let first = app
        .upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &app.admin_token)
        .await;
    assert_eq!(first.status, 200, "{}", first.text);

    // Removing the object makes a second write observable.
    app.bucket.delete(&key).await.unwrap();

    let second = app
        .upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &app.admin_token)
        .await;
    assert_eq!(second.status, 200, "{}", second.text);
    assert_eq!(second.body, first.body);

    assert_eq!(media_key(&app, id).await.as_deref(), Some(key.as_str()));
    assert!(!app.bucket.exists(&key).await.unwrap());
}

#[tokio::test]
async fn new_content_replaces_the_key() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;

    app.upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &app.admin_token)
        .await;
    let res = app
        .upload_with_token(&routes::media_upload(id), "frame.png", b"another frame", &app.admin_token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let key = expected_key(b"another frame", "frame.png", MEDIA_FOLDER);
    assert_eq!(media_key(&app, id).await.as_deref(), Some(key.as_str()));
}

#[tokio::test]
async fn corrupted_upload_is_rejected_and_removed() {
    let app = TestApp::spawn_with(TestBucket::Corrupting).await;
    let id = app.create_media("image").await;

    let res = app
        .upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &app.admin_token)
        .await;

    assert_eq!(res.status, 500);
    assert_eq!(res.body["detail"], "Data was corrupted during upload");
    assert_eq!(media_key(&app, id).await, None);

    let key = expected_key(FRAME, "frame.jpg", MEDIA_FOLDER);
    assert!(!app.bucket.exists(&key).await.unwrap());
}

#[tokio::test]
async fn corrupted_upload_keeps_the_previous_key() {
    let app = TestApp::spawn_with(TestBucket::Corrupting).await;
    let id = app.create_media("image").await;
    let previous = "media/previous.jpg".to_string();

    let mut active: media::ActiveModel = media::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .into();
    active.bucket_key = sea_orm::Set(Some(previous.clone()));
    sea_orm::ActiveModelTrait::update(active, &app.db).await.unwrap();

    let res = app
        .upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &app.admin_token)
        .await;

    assert_eq!(res.status, 500);
    assert_eq!(media_key(&app, id).await, Some(previous));
}

#[tokio::test]
async fn upload_to_missing_media_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app
        .upload_with_token(&routes::media_upload(999), "frame.jpg", FRAME, &app.admin_token)
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["detail"], "Table media has no entry with id=999");
}

#[tokio::test]
async fn upload_requires_a_token() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;

    let res = app
        .client
        .post(format!("http://{}{}", app.addr, routes::media_upload(id)))
        .multipart(reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(FRAME.to_vec()).file_name("frame.jpg"),
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn user_scope_may_upload() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;
    let (_, token) = app.user().await;

    let res = app
        .upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = TestApp::spawn().await;
    let id = app.create_media("video").await;
    let huge = vec![0u8; MAX_UPLOAD_SIZE + 1024];

    let res = app
        .upload_with_token(&routes::media_upload(id), "clip.mp4", &huge, &app.admin_token)
        .await;

    assert_eq!(res.status, 422);
    assert_eq!(media_key(&app, id).await, None);
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;

    let res = app
        .client
        .post(format!("http://{}{}", app.addr, routes::media_upload(id)))
        .bearer_auth(&app.admin_token)
        .multipart(reqwest::multipart::Form::new().text("note", "no file here"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 422);
}

#[tokio::test]
async fn media_url_points_at_uploaded_content() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;
    app.upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &app.admin_token)
        .await;

    let res = app.get_with_token(&routes::media_url(id), &app.admin_token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let url = res.body["url"].as_str().unwrap();
    assert!(url.contains(&expected_key(FRAME, "frame.jpg", MEDIA_FOLDER)));
}

#[tokio::test]
async fn media_url_of_vanished_object_is_not_found() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;
    app.upload_with_token(&routes::media_upload(id), "frame.jpg", FRAME, &app.admin_token)
        .await;
    app.bucket
        .delete(&expected_key(FRAME, "frame.jpg", MEDIA_FOLDER))
        .await
        .unwrap();

    let res = app.get_with_token(&routes::media_url(id), &app.admin_token).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["detail"], "File cannot be found on the bucket storage");
}

#[tokio::test]
async fn user_cannot_resolve_media_url() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;
    let (_, token) = app.user().await;

    let res = app.get_with_token(&routes::media_url(id), &token).await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "READ_FORBIDDEN");
}

#[tokio::test]
async fn annotation_upload_uses_its_own_folder() {
    let app = TestApp::spawn().await;
    let media_id = app.create_media("image").await;
    let id = app.create_annotation(media_id).await;
    let content = br#"{"observations": ["smoke", "clouds"]}"#;

    let res = app
        .upload_with_token(&routes::annotation_upload(id), "labels.json", content, &app.admin_token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["media_id"], media_id);

    let key = expected_key(content, "labels.json", ANNOTATIONS_FOLDER);
    let stored = annotation::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.bucket_key.as_deref(), Some(key.as_str()));

    let url = app.get_with_token(&routes::annotation_url(id), &app.admin_token).await;
    assert_eq!(url.status, 200);
    assert!(url.body["url"].as_str().unwrap().contains(&key));
}

#[tokio::test]
async fn overlong_file_name_is_rejected_without_storing() {
    let app = TestApp::spawn().await;
    let id = app.create_media("image").await;
    let name = format!("frame.{}", "x".repeat(120));

    let res = app
        .upload_with_token(&routes::media_upload(id), &name, FRAME, &app.admin_token)
        .await;

    assert_eq!(res.status, 422, "{}", res.text);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(media_key(&app, id).await, None);

    let key = expected_key(FRAME, &name, MEDIA_FOLDER);
    assert!(!app.bucket.exists(&key).await.unwrap());
}
