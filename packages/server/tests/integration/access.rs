use serde_json::json;

use server::entity::access::Scope;

use crate::common::{SUPERUSER_LOGIN, TestApp, routes};

mod creation {
    use super::*;

    #[tokio::test]
    async fn admin_creates_a_user_access_by_default() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(
                routes::ACCESSES,
                &json!({"login": "camera_1", "password": "pwd"}),
                &app.admin_token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.id() > 1);
        assert_eq!(res.body["login"], "camera_1");
        assert_eq!(res.body["scope"], "user");
        assert!(res.body.get("hashed_password").is_none());
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn duplicate_login_is_a_conflict_and_keeps_the_first() {
        let app = TestApp::spawn().await;
        let body = json!({"login": "camera_1", "password": "pwd"});

        let first = app.post_with_token(routes::ACCESSES, &body, &app.admin_token).await;
        assert_eq!(first.status, 201, "{}", first.text);

        let second = app
            .post_with_token(
                routes::ACCESSES,
                &json!({"login": "camera_1", "password": "other", "scope": "admin"}),
                &app.admin_token,
            )
            .await;

        assert_eq!(second.status, 409);
        assert_eq!(
            second.body["detail"],
            "An entry with login='camera_1' already exists."
        );

        let stored = app
            .get_with_token(&routes::access(first.id()), &app.admin_token)
            .await;
        assert_eq!(stored.body["scope"], "user");
    }

    #[tokio::test]
    async fn login_length_is_validated() {
        let app = TestApp::spawn().await;

        for login in ["ab".to_string(), "a".repeat(51)] {
            let res = app
                .post_with_token(
                    routes::ACCESSES,
                    &json!({"login": login, "password": "pwd"}),
                    &app.admin_token,
                )
                .await;
            assert_eq!(res.status, 422, "login {login:?}");
        }
    }

    #[tokio::test]
    async fn user_cannot_create_accesses() {
        let app = TestApp::spawn().await;
        let (_, token) = app.user().await;

        let res = app
            .post_with_token(
                routes::ACCESSES,
                &json!({"login": "intruder", "password": "pwd", "scope": "admin"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(
            res.body["detail"],
            "Your access scope is not compatible with this operation."
        );
    }
}

mod management {
    use super::*;

    #[tokio::test]
    async fn admin_lists_accesses_in_creation_order() {
        let app = TestApp::spawn().await;
        app.create_access("first", Scope::User).await;
        app.create_access("second", Scope::Admin).await;

        let res = app.get_with_token(routes::ACCESSES, &app.admin_token).await;

        assert_eq!(res.status, 200);
        let logins: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["login"].as_str().unwrap())
            .collect();
        assert_eq!(logins, [SUPERUSER_LOGIN, "first", "second"]);
    }

    #[tokio::test]
    async fn replaced_password_is_used_at_login() {
        let app = TestApp::spawn().await;
        let (id, _) = app.user().await;

        let res = app
            .put_with_token(&routes::access(id), &json!({"password": "new_pwd"}), &app.admin_token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["id"], id);

        let old = app
            .post_form(routes::LOGIN, &[("username", "JohnDoe"), ("password", "pwd")])
            .await;
        assert_eq!(old.status, 401);

        let new = app
            .post_form(routes::LOGIN, &[("username", "JohnDoe"), ("password", "new_pwd")])
            .await;
        assert_eq!(new.status, 200);
    }

    #[tokio::test]
    async fn deleted_access_is_returned_then_gone() {
        let app = TestApp::spawn().await;
        let (id, _) = app.user().await;

        let res = app.delete_with_token(&routes::access(id), &app.admin_token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["login"], "JohnDoe");

        let res = app.get_with_token(&routes::access(id), &app.admin_token).await;
        assert_eq!(res.status, 404);
        assert_eq!(
            res.body["detail"],
            format!("Table accesses has no entry with id={id}")
        );
    }

    #[tokio::test]
    async fn unlimited_token_carries_the_stored_scope() {
        let app = TestApp::spawn().await;
        let (id, _) = app.user().await;

        let res = app
            .post_with_token(&routes::access_token(id), &json!({}), &app.admin_token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let token = res.body["access_token"].as_str().unwrap();

        let verified = app.tokens.verify(token).unwrap();
        assert_eq!(verified.access_id, id);
        assert_eq!(verified.scopes, vec![Scope::User]);
    }

    #[tokio::test]
    async fn user_cannot_read_accesses() {
        let app = TestApp::spawn().await;
        let (id, token) = app.user().await;

        let res = app.get_with_token(&routes::access(id), &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "SCOPE_MISMATCH");
    }

    #[tokio::test]
    async fn non_positive_id_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(&routes::access(0), &app.admin_token).await;

        assert_eq!(res.status, 422);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
