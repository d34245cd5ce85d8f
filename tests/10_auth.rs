mod common;

use anyhow::Result;
use axum::http::StatusCode;
use rental_api::store::KvStore;
use serde_json::json;

#[tokio::test]
async fn login_issues_a_verifiable_token() -> Result<()> {
    let app = common::spawn_app();

    let token = app.login().await;
    assert_eq!(token.len(), 64);

    let (status, body) = app.request("GET", "/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": true, "username": common::ADMIN_USER }));
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() -> Result<()> {
    let app = common::spawn_app();

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": common::ADMIN_USER, "password": "wrong" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn login_with_missing_fields_is_bad_request() -> Result<()> {
    let app = common::spawn_app();

    let (status, body) = app
        .request("POST", "/auth/login", None, Some(json!({ "username": common::ADMIN_USER })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password are required");
    Ok(())
}

#[tokio::test]
async fn verify_without_token_is_unauthorized() -> Result<()> {
    let app = common::spawn_app();

    let (status, _) = app.request("GET", "/auth/verify", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_revokes_the_session() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await;

    let (status, body) = app.request("POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let (status, _) = app.request("GET", "/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_without_token_is_unauthorized() -> Result<()> {
    let app = common::spawn_app();

    let (status, _) = app.request("POST", "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_session_is_rejected_even_if_the_record_survives() -> Result<()> {
    let app = common::spawn_app();

    // Record still present in the store but past its expiresAt, as if the
    // store-side TTL had not fired yet.
    let stale = json!({
        "username": common::ADMIN_USER,
        "createdAt": "2000-01-01T00:00:00Z",
        "expiresAt": "2000-01-02T00:00:00Z",
    });
    app.store.set("session:staletoken", &stale.to_string()).await?;

    let (status, body) = app.request("GET", "/auth/verify", Some("staletoken"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Session expired");

    // Lazy deletion kicked in; the repeat verify is rejected the same way.
    assert!(app.store.get("session:staletoken").await?.is_none());
    let (status, _) = app.request("GET", "/auth/verify", Some("staletoken"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
