// src/handlers/passkey.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use webauthn_rs::prelude::PublicKeyCredential;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::auth::auth_response,
    middleware::{auth::AdminUser, i18n::Locale},
    models::{auth::AuthResponse, passkey::RegistrationVerified},
};

#[utoipa::path(
    post,
    path = "/api/auth/passkey/register-options",
    tag = "Passkeys",
    responses(
        (status = 200, description = "Opções de criação da credencial", body = Object),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_options(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(claims): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let options = app_state
        .passkey_service
        .registration_options(&claims.username)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(options))
}

#[utoipa::path(
    post,
    path = "/api/auth/passkey/register-verify",
    tag = "Passkeys",
    request_body = Object,
    responses(
        (status = 201, description = "Passkey cadastrada", body = RegistrationVerified),
        (status = 400, description = "Desafio ausente ou expirado"),
        (status = 401, description = "Verificação falhou"),
        (status = 409, description = "Credencial já cadastrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_verify(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(claims): AdminUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(raw) = payload
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .passkey_service
        .verify_registration(&claims.username, raw)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationVerified {
            success: true,
            verified: true,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/passkey/auth-options",
    tag = "Passkeys",
    responses(
        (status = 200, description = "Opções de autenticação", body = Object),
        (status = 404, description = "Nenhuma passkey cadastrada")
    )
)]
pub async fn auth_options(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let username = app_state.auth_service.admin_username().to_string();

    let options = app_state
        .passkey_service
        .authentication_options(&username)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(options))
}

#[utoipa::path(
    post,
    path = "/api/auth/passkey/auth-verify",
    tag = "Passkeys",
    request_body = Object,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 400, description = "Desafio ausente ou expirado"),
        (status = 401, description = "Verificação falhou")
    )
)]
pub async fn auth_verify(
    State(app_state): State<AppState>,
    locale: Locale,
    payload: Result<Json<PublicKeyCredential>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(credential) = payload
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let username = app_state.auth_service.admin_username().to_string();

    let token = async {
        app_state
            .passkey_service
            .verify_authentication(&username, &credential)
            .await?;
        app_state.auth_service.issue_token()
    }
    .await
    .map_err(|e: AppError| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(auth_response(&app_state, &locale, token)))
}
