// src/handlers/auth.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AdminUser, i18n::Locale},
    models::auth::{AuthResponse, LoginPayload, VerifyResponse},
};

/// Monta a resposta de login. Usada também pelo login com passkey.
pub(crate) fn auth_response(
    app_state: &AppState,
    locale: &Locale,
    token: String,
) -> AuthResponse {
    AuthResponse {
        success: true,
        message: app_state.i18n_store.translate(&locale.0, "auth.login_success"),
        token,
        user: app_state.auth_service.admin_profile(),
    }
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 400, description = "Usuário ou senha ausentes"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .login(payload.username.as_deref(), payload.password.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("🔐 Login do admin por senha");

    Ok((StatusCode::OK, Json(auth_response(&app_state, &locale, token))))
}

// Handler da verificação do token
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token válido", body = VerifyResponse),
        (status = 401, description = "Token ausente, inválido ou expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify(AdminUser(claims): AdminUser) -> impl IntoResponse {
    Json(VerifyResponse {
        success: true,
        user: claims,
    })
}
