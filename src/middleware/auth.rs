// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::Claims,
    services::auth::AuthService,
};

/// Lê o `Authorization: Bearer` e valida o token do admin.
pub fn authorize(headers: &HeaderMap, auth_service: &AuthService) -> Result<Claims, AppError> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::MissingToken)?;

    auth_service.validate_token(bearer.token())
}

// Extrator usado por todos os handlers protegidos
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        authorize(&parts.headers, &app_state.auth_service)
            .map(AdminUser)
            .map_err(|e| {
                let locale = Locale::from_headers(&parts.headers);
                e.to_api_error(&locale, &app_state.i18n_store)
            })
    }
}
