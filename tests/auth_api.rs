//! Login por senha, verificação de token e o envelope de erro.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{body_json, build_test_app, get_auth, post_json, send, ADMIN_PASSWORD, ADMIN_USERNAME};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn wrong_password_returns_401_envelope() {
    let (app, _) = build_test_app();

    let response = post_json(
        app,
        "/api/auth",
        json!({ "username": ADMIN_USERNAME, "password": "salah" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn error_message_follows_accept_language() {
    let (app, _) = build_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .body(Body::from(
            json!({ "username": ADMIN_USERNAME, "password": "salah" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Wrong username or password!");
}

#[tokio::test]
async fn missing_fields_return_400() {
    let (app, _) = build_test_app();

    let response = post_json(app, "/api/auth", json!({ "username": ADMIN_USERNAME })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn malformed_json_returns_400_envelope() {
    let (app, _) = build_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ nao e json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["details"]["body"].is_array());
}

#[tokio::test]
async fn login_then_verify_round_trip() {
    let (app, _) = build_test_app();

    let response = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], ADMIN_USERNAME);
    assert_eq!(body["user"]["role"], "admin");
    let token = body["token"].as_str().unwrap().to_string();

    for uri in ["/api/auth", "/api/auth/verify"] {
        let response = get_auth(app.clone(), uri, &token).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["username"], ADMIN_USERNAME);
        assert!(body["user"]["exp"].as_u64().unwrap() > body["user"]["iat"].as_u64().unwrap());
    }
}

#[tokio::test]
async fn verify_without_token_is_401() {
    let (app, _) = build_test_app();

    let response = send(app, Method::GET, "/api/auth/verify", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn tampered_token_is_401() {
    let (app, state) = build_test_app();
    let token = common::admin_token(&state);

    // Troca o payload mantendo a assinatura original
    let mut parts: Vec<&str> = token.split('.').collect();
    let forged_payload = "eyJ1c2VybmFtZSI6Im1hbGxvcnkiLCJyb2xlIjoiYWRtaW4iLCJpYXQiOjAsImV4cCI6OTk5OTk5OTk5OX0";
    parts[1] = forged_payload;
    let forged = parts.join(".");

    let response = get_auth(app, "/api/auth/verify", &forged).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
