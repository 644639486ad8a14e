// src/handlers/upload.rs

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AdminUser, i18n::Locale},
};

const FILE_FIELD: &str = "file";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    #[schema(example = "https://abc.public.blob.vercel-storage.com/poster-x1y2.jpg")]
    pub url: String,
}

struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

// Procura o campo `file`; os outros campos são ignorados
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = field.bytes().await?.to_vec();

        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Err(AppError::NoFileUploaded)
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Upload",
    request_body(content_type = "multipart/form-data", description = "Campo `file` com o arquivo"),
    responses(
        (status = 200, description = "Arquivo enviado", body = UploadResponse),
        (status = 400, description = "Nenhum arquivo enviado"),
        (status = 401, description = "Token ausente ou inválido"),
        (status = 500, description = "Falha no blob storage")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_file(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = async {
        // Requisição que nem é multipart também é "sem arquivo"
        let mut multipart = multipart.map_err(|_| AppError::NoFileUploaded)?;
        let file = read_file_field(&mut multipart).await?;
        tracing::debug!(
            "Upload recebido: {} ({}, {} bytes)",
            file.filename,
            file.content_type,
            file.bytes.len()
        );
        app_state
            .blob_store
            .put(&file.filename, &file.content_type, file.bytes)
            .await
    }
    .await
    .map_err(|e: AppError| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
    }))
}
