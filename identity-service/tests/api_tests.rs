mod common;

use auth::Role;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::spawn().await;

    let response = app.login("ghost", "whatever").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 401);
    assert_eq!(body["data"]["succeeded"], false);
    assert_eq!(body["data"]["reason"], "UNKNOWN_USER");
    assert!(body["data"].get("token").is_none());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;

    let response = app.login("alice", "wrong").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "BAD_PASSWORD");
    assert!(body["data"].get("token").is_none());
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;

    let response = app.login("alice", "secret1").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["succeeded"], true);
    assert_eq!(body["data"]["reason"], "LOGGED_IN");
    assert_eq!(body["data"]["message"], "Login successful");
    assert_eq!(body["data"]["identity"]["username"], "alice");
    assert_eq!(body["data"]["identity"]["role"], "STUDENT");
    assert_eq!(body["data"]["identity"]["fullName"], "alice Example");
    assert_eq!(body["data"]["identity"]["firstLoginPending"], true);

    let token = body["data"]["token"].as_str().unwrap();
    let claims = app.token_codec.decode(token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.role, Role::Student);
    assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    assert_eq!(
        body["data"]["identity"]["userId"].as_i64(),
        Some(claims.user_id)
    );
}

#[tokio::test]
async fn test_login_blank_username_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app.login("   ", "secret1").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_login_missing_password_is_bad_password() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "username": "alice" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "BAD_PASSWORD");
}

#[tokio::test]
async fn test_whitespace_password_round_trip() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;

    let response = app
        .post("/api/auth/change-initial-password")
        .json(&json!({ "username": "alice", "newPassword": "      " }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.login("alice", "      ").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "LOGGED_IN");
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
async fn test_change_initial_password_weak() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;
    let before = app.store.get("alice").unwrap();

    let response = app
        .post("/api/auth/change-initial-password")
        .json(&json!({ "username": "alice", "newPassword": "ab" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "WEAK_PASSWORD");

    let after = app.store.get("alice").unwrap();
    assert_eq!(after.password_hash, before.password_hash);
    assert!(after.first_login_pending);
}

#[tokio::test]
async fn test_change_initial_password_empty_is_weak() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;

    for body in [
        json!({ "username": "alice", "newPassword": "" }),
        json!({ "username": "alice" }),
    ] {
        let response = app
            .post("/api/auth/change-initial-password")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["data"]["reason"], "WEAK_PASSWORD");
    }

    assert!(app.store.get("alice").unwrap().first_login_pending);
}

#[tokio::test]
async fn test_change_initial_password_success() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;

    let response = app
        .post("/api/auth/change-initial-password")
        .json(&json!({ "username": "alice", "newPassword": "fresh-secret" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "PASSWORD_CHANGED");
    assert!(body["data"].get("token").is_none());
    assert!(!app.store.get("alice").unwrap().first_login_pending);

    // Old password no longer works, the new one does
    let old_login = app.login("alice", "secret1").await;
    assert_eq!(old_login.status(), StatusCode::UNAUTHORIZED);

    let new_login: serde_json::Value = app
        .login("alice", "fresh-secret")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(new_login["data"]["identity"]["firstLoginPending"], false);
}

#[tokio::test]
async fn test_change_initial_password_unknown_user() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/change-initial-password")
        .json(&json!({ "username": "ghost", "newPassword": "fresh-secret" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "UNKNOWN_USER");
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;
    let token = app.login_token("alice", "secret1").await;

    let response = app
        .post_authenticated("/api/auth/change-password", &token)
        .json(&json!({ "oldPassword": "secret1", "newPassword": "secret2" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["succeeded"], true);
    assert_eq!(body["data"]["reason"], "PASSWORD_CHANGED");

    assert_eq!(
        app.login("alice", "secret1").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(app.login("alice", "secret2").await.status(), StatusCode::OK);

    // Replaying the same change now fails on the old password
    let replay = app
        .post_authenticated("/api/auth/change-password", &token)
        .json(&json!({ "oldPassword": "secret1", "newPassword": "secret2" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = replay.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "BAD_OLD_PASSWORD");
}

#[tokio::test]
async fn test_change_password_weak_new_password() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;
    let token = app.login_token("alice", "secret1").await;

    let response = app
        .post_authenticated("/api/auth/change-password", &token)
        .json(&json!({ "oldPassword": "secret1", "newPassword": "abc" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.login("alice", "secret1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_empty_old_password() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;
    let token = app.login_token("alice", "secret1").await;

    // Old password is checked before the new one is judged
    let response = app
        .post_authenticated("/api/auth/change-password", &token)
        .json(&json!({ "oldPassword": "", "newPassword": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "BAD_OLD_PASSWORD");
    assert_eq!(app.login("alice", "secret1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_missing_token() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/change-password")
        .json(&json!({ "oldPassword": "secret1", "newPassword": "secret2" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "MISSING_TOKEN");
}

#[tokio::test]
async fn test_change_password_garbage_token() {
    let app = TestApp::spawn().await;

    let response = app
        .post_authenticated("/api/auth/change-password", "not-a-jwt")
        .json(&json!({ "oldPassword": "secret1", "newPassword": "secret2" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;

    let stale = app
        .token_codec
        .issue("alice", Role::Student, 1, Utc::now() - Duration::hours(25))
        .unwrap();

    let response = app
        .get_authenticated("/api/auth/me", &stale.value)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["reason"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_current_identity() {
    let app = TestApp::spawn().await;
    app.provision("alice", "secret1").await;
    let token = app.login_token("alice", "secret1").await;

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "STUDENT");
    assert!(body["data"]["userId"].is_i64());
}
