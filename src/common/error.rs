// src/common/error.rs

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio. Os handlers convertem para `ApiError` com a mensagem
// traduzida via `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(String),

    // --- Auth ---
    #[error("Usuário e senha são obrigatórios")]
    MissingCredentials,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token ausente")]
    MissingToken,

    #[error("Token inválido")]
    InvalidToken,

    // --- Passkeys ---
    #[error("Desafio WebAuthn ausente ou expirado")]
    ChallengeMissing,

    #[error("Nenhuma passkey cadastrada")]
    PasskeyNotRegistered,

    #[error("Passkey já cadastrada")]
    PasskeyAlreadyRegistered,

    #[error("Falha no WebAuthn: {0}")]
    PasskeyRejected(#[from] webauthn_rs::prelude::WebauthnError),

    // --- Invoices ---
    #[error("Invoice não encontrada")]
    InvoiceNotFound,

    #[error("ID de invoice inválido")]
    InvalidInvoiceId,

    #[error("ID de invoice ausente")]
    InvoiceIdRequired,

    #[error("Número de invoice já existe")]
    InvoiceNumberTaken,

    #[error("DP maior que o total da invoice")]
    DownPaymentExceedsTotal,

    // --- Portfólio ---
    #[error("Projeto não encontrado")]
    ProjectNotFound,

    #[error("ID de projeto ausente")]
    ProjectIdRequired,

    #[error("Fixture do portfólio não encontrada")]
    FixtureMissing,

    // --- Upload ---
    #[error("Nenhum arquivo enviado")]
    NoFileUploaded,

    #[error("Erro no blob storage: {0}")]
    BlobStorage(String),

    #[error("Erro HTTP: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Corpo JSON ausente ou malformado vira 400 com o motivo em `details`
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        AppError::MalformedBody(error.body_text())
    }
}

// O erro que de fato vira resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
    // Mensagem original, só preenchida fora de produção
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            error: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "message": self.message,
        });

        if let Some(details) = self.details {
            body["details"] = details;
        }
        if let Some(error) = self.error {
            body["error"] = Value::String(error);
        }

        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedBody(_)
            | AppError::MissingCredentials
            | AppError::ChallengeMissing
            | AppError::InvalidInvoiceId
            | AppError::InvoiceIdRequired
            | AppError::DownPaymentExceedsTotal
            | AppError::ProjectIdRequired
            | AppError::NoFileUploaded => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::PasskeyRejected(_) => StatusCode::UNAUTHORIZED,

            AppError::PasskeyNotRegistered
            | AppError::InvoiceNotFound
            | AppError::ProjectNotFound
            | AppError::FixtureMissing => StatusCode::NOT_FOUND,

            AppError::InvoiceNumberTaken | AppError::PasskeyAlreadyRegistered => {
                StatusCode::CONFLICT
            }

            AppError::BlobStorage(_)
            | AppError::HttpClient(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave do catálogo de mensagens
    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::MalformedBody(_) => "validation.failed",
            AppError::MissingCredentials => "auth.missing_credentials",
            AppError::InvalidCredentials => "auth.invalid_credentials",
            AppError::MissingToken => "auth.token_missing",
            AppError::InvalidToken => "auth.token_invalid",
            AppError::ChallengeMissing => "passkey.challenge_missing",
            AppError::PasskeyNotRegistered => "passkey.not_registered",
            AppError::PasskeyAlreadyRegistered => "passkey.already_registered",
            AppError::PasskeyRejected(_) => "passkey.verification_failed",
            AppError::InvoiceNotFound => "invoice.not_found",
            AppError::InvalidInvoiceId => "invoice.invalid_id",
            AppError::InvoiceIdRequired => "invoice.id_required",
            AppError::InvoiceNumberTaken => "invoice.number_taken",
            AppError::DownPaymentExceedsTotal => "invoice.dp_exceeds_total",
            AppError::ProjectNotFound => "project.not_found",
            AppError::ProjectIdRequired => "project.id_required",
            AppError::FixtureMissing => "project.fixture_missing",
            AppError::NoFileUploaded => "upload.no_file",
            AppError::BlobStorage(_) | AppError::HttpClient(_) => "upload.failed",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "server.internal",
        }
    }

    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        let mut api_error = ApiError::new(status, i18n.translate(&locale.0, self.message_key()));

        match self {
            // Retorna todos os detalhes da validação, campo a campo
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .map(Value::String)
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                for (field, nested) in errors.errors() {
                    if let validator::ValidationErrorsKind::List(items) = nested {
                        let indexes: Vec<Value> = items.keys().map(|i| json!(i)).collect();
                        details.insert(field.to_string(), Value::Array(indexes));
                    }
                }
                api_error.details = Some(Value::Object(details));
            }
            AppError::MalformedBody(reason) => {
                api_error.details = Some(json!({ "body": [reason] }));
            }
            _ => {}
        }

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
            if i18n.expose_internal_errors() {
                api_error.error = Some(self.to_string());
            }
        }

        api_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn buckets_map_to_expected_statuses() {
        assert_eq!(AppError::MissingCredentials.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::ProjectNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::ChallengeMissing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvoiceNumberTaken.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_hidden_in_production() {
        let i18n = I18nStore::load(false).unwrap();
        let err = AppError::InternalServerError(anyhow::anyhow!("conexão recusada"));
        let api = err.to_api_error(&locale("en"), &i18n);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Something went wrong!");
        assert!(api.error.is_none());
    }

    #[test]
    fn internal_detail_is_echoed_in_development() {
        let i18n = I18nStore::load(true).unwrap();
        let err = AppError::InternalServerError(anyhow::anyhow!("conexão recusada"));
        let api = err.to_api_error(&locale("en"), &i18n);

        assert!(api.error.unwrap().contains("conexão recusada"));
    }

    #[test]
    fn token_signing_failure_is_reported_as_internal() {
        let i18n = I18nStore::load(false).unwrap();
        let err = AppError::JwtError(jsonwebtoken::errors::ErrorKind::InvalidKeyFormat.into());
        let api = err.to_api_error(&locale("en"), &i18n);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Something went wrong!");
    }

    #[test]
    fn client_errors_never_carry_internal_detail() {
        let i18n = I18nStore::load(true).unwrap();
        let api = AppError::InvoiceNotFound.to_api_error(&locale("id"), &i18n);

        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.message, "Invoice tidak ditemukan");
        assert!(api.error.is_none());
    }
}
