//! Registration, sign-in and token handling against a running server.
//!
//! Requires the API server (cargo run -p casawood-api) and a migrated database.

#![allow(clippy::unwrap_used)]

use casawood_integration_tests::{TestClient, unique_email};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_then_login() {
    let anonymous = TestClient::anonymous();
    let email = unique_email("login");

    let (status, body) = anonymous
        .post(
            "/api/auth/register",
            json!({"name": "Asha Rao", "email": email, "password": "correct-horse-42"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["email"], email);
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let (status, body) = anonymous
        .post(
            "/api/auth/login",
            json!({"email": email.to_uppercase(), "password": "correct-horse-42"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_email_conflicts() {
    let anonymous = TestClient::anonymous();
    let email = unique_email("dup");
    let register = json!({"name": "Asha Rao", "email": email, "password": "correct-horse-42"});

    let (status, _) = anonymous.post("/api/auth/register", register.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = anonymous.post("/api/auth/register", register).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_password_is_401() {
    let anonymous = TestClient::anonymous();
    let email = unique_email("wrongpw");
    anonymous
        .post(
            "/api/auth/register",
            json!({"name": "Asha Rao", "email": email, "password": "correct-horse-42"}),
        )
        .await;

    let (status, body) = anonymous
        .post("/api/auth/login", json!({"email": email, "password": "battery-staple"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_me_and_profile_update() {
    let user = TestClient::register("Dev Kapoor").await;

    let (status, body) = user.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Dev Kapoor");

    let (status, body) = user
        .put("/api/users/profile", json!({"phone": "0 98450 12345"}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["phone"], "9845012345");
    assert_eq!(body["data"]["name"], "Dev Kapoor");

    let (status, body) = user.put("/api/users/profile", json!({"phone": "12345"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "phone");
}
