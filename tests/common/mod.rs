//! Helpers compartilhados pelos testes de integração.
//!
//! O router é o mesmo do binário (`routes::app`). O pool é criado com
//! `connect_lazy`, então rotas que não tocam o banco rodam sem Postgres.

#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use url::Url;

use studio_backend::{
    common::error::AppError,
    config::{
        AdminCredentials, AdminPassword, AppState, BlobConfig, Config, Environment,
        WebauthnConfig,
    },
    routes,
    services::blob::{is_managed_blob_url, BlobStore, StoredBlob},
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "rahasia";

/// Storage em memória: devolve uma URL previsível e não apaga nada.
#[derive(Default)]
pub struct FakeBlobStore;

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<StoredBlob, AppError> {
        Ok(StoredBlob {
            url: format!("https://teste.public.blob.vercel-storage.com/{}", filename),
            pathname: Some(filename.to_string()),
            content_type: Some(content_type.to_string()),
        })
    }

    async fn delete(&self, _url: &str) -> Result<(), AppError> {
        Ok(())
    }

    fn is_managed_url(&self, url: &str) -> bool {
        is_managed_blob_url(url, ".blob.vercel-storage.com")
    }
}

/// Storage cujo `delete` sempre falha; guarda as URLs que tentou apagar.
#[derive(Default)]
pub struct FailingBlobStore {
    pub delete_attempts: Mutex<Vec<String>>,
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(
        &self,
        _filename: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<StoredBlob, AppError> {
        Err(AppError::BlobStorage("storage fora do ar".to_string()))
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        self.delete_attempts.lock().unwrap().push(url.to_string());
        Err(AppError::BlobStorage("storage fora do ar".to_string()))
    }

    fn is_managed_url(&self, url: &str) -> bool {
        is_managed_blob_url(url, ".blob.vercel-storage.com")
    }
}

pub fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        jwt_secret: "segredo-dos-testes".to_string(),
        jwt_ttl: chrono::Duration::days(7),
        admin: AdminCredentials {
            username: ADMIN_USERNAME.to_string(),
            password: AdminPassword::Plain(ADMIN_PASSWORD.to_string()),
        },
        blob: BlobConfig {
            token: None,
            api_url: "https://blob.vercel-storage.com".to_string(),
            host_suffix: ".blob.vercel-storage.com".to_string(),
        },
        webauthn: WebauthnConfig {
            rp_id: "localhost".to_string(),
            rp_origin: Url::parse("http://localhost:5173").unwrap(),
            rp_name: "Just Jeje".to_string(),
        },
        cors_origins: vec!["http://localhost:5173".to_string()],
        fixture_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/portfolio.json"),
        environment: Environment::Production,
        host: "127.0.0.1".to_string(),
        port: 0,
        body_limit_bytes: 10 * 1024 * 1024,
    }
}

/// Pool que nunca conecta de fato, para rotas sem banco.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://ninguem@127.0.0.1:1/inexistente")
        .unwrap()
}

pub fn build_state(pool: PgPool) -> AppState {
    build_state_with_store(pool, Arc::new(FakeBlobStore))
}

pub fn build_state_with_store(pool: PgPool, blob_store: Arc<dyn BlobStore>) -> AppState {
    AppState::from_parts(test_config("postgres://teste"), pool, blob_store).unwrap()
}

/// App sem banco (pool preguiçoso).
pub fn build_test_app() -> (Router, AppState) {
    let state = build_state(lazy_pool());
    (routes::app(state.clone()), state)
}

/// App ligado a um banco real (`#[sqlx::test]`).
pub fn build_db_app(pool: PgPool) -> (Router, AppState) {
    let state = build_state(pool);
    (routes::app(state.clone()), state)
}

/// App com banco real e um storage escolhido pelo teste.
pub fn build_db_app_with_store(pool: PgPool, blob_store: Arc<dyn BlobStore>) -> (Router, AppState) {
    let state = build_state_with_store(pool, blob_store);
    (routes::app(state.clone()), state)
}

pub fn admin_token(state: &AppState) -> String {
    state.auth_service.issue_token().unwrap()
}

// ---------------------------------------------------------------------------
// Requisições
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
