// src/handlers/invoices.rs

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::{
        error::{ApiError, AppError},
        response::ApiResponse,
    },
    config::AppState,
    middleware::{
        auth::{authorize, AdminUser},
        i18n::Locale,
    },
    models::invoice::{InvoiceDetail, InvoicePayload},
    services::invoice_service::{next_invoice_number, parse_invoice_id},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    /// UUID da invoice
    pub id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextInvoiceNumber {
    #[schema(example = "INV/2025/01/1736899200000-42")]
    pub invoice_number: String,
}

// ---
// Núcleo compartilhado entre as rotas `?id=` e `/{id}`
// ---

async fn fetch(app_state: &AppState, raw_id: &str) -> Result<InvoiceDetail, AppError> {
    let id = parse_invoice_id(raw_id)?;
    app_state.invoice_service.get(id).await
}

async fn replace(
    app_state: &AppState,
    raw_id: Option<&str>,
    payload: Result<Json<InvoicePayload>, JsonRejection>,
) -> Result<InvoiceDetail, AppError> {
    let id = parse_invoice_id(raw_id.unwrap_or_default())?;
    let Json(payload) = payload?;
    app_state.invoice_service.update(id, payload).await
}

async fn remove(app_state: &AppState, raw_id: Option<&str>) -> Result<(), AppError> {
    let id = parse_invoice_id(raw_id.unwrap_or_default())?;
    app_state.invoice_service.delete(id).await
}

// ---
// Handlers
// ---

/// Com `?id=` busca uma invoice (público, é o link enviado ao cliente).
/// Sem `id`, lista todas (só admin).
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    params(IdQuery),
    responses(
        (status = 200, description = "Invoice ou lista de invoices", body = Vec<InvoiceDetail>),
        (status = 400, description = "ID inválido"),
        (status = 401, description = "Listagem sem token"),
        (status = 404, description = "Invoice não encontrada")
    ),
    security((), ("api_jwt" = []))
)]
pub async fn get_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    if let Some(raw_id) = query.id.as_deref() {
        let invoice = fetch(&app_state, raw_id).await.map_err(to_api)?;
        return Ok(ApiResponse::ok(invoice).into_response());
    }

    authorize(&headers, &app_state.auth_service).map_err(to_api)?;

    let invoices = app_state.invoice_service.list().await.map_err(to_api)?;
    Ok(ApiResponse::ok(invoices).into_response())
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = String, Path, description = "UUID da invoice")),
    responses(
        (status = 200, description = "Invoice", body = InvoiceDetail),
        (status = 400, description = "ID inválido"),
        (status = 404, description = "Invoice não encontrada")
    )
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = fetch(&app_state, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(invoice))
}

#[utoipa::path(
    get,
    path = "/api/invoices/next-number",
    tag = "Invoices",
    responses(
        (status = 200, description = "Número sugerido", body = NextInvoiceNumber),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn next_number(_admin: AdminUser) -> impl IntoResponse {
    ApiResponse::ok(NextInvoiceNumber {
        invoice_number: next_invoice_number(Utc::now()),
    })
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = InvoicePayload,
    responses(
        (status = 201, description = "Invoice criada", body = InvoiceDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Token ausente ou inválido"),
        (status = 409, description = "Número de invoice já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    payload: Result<Json<InvoicePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let Json(payload) = payload.map_err(|e| to_api(e.into()))?;
    let invoice = app_state
        .invoice_service
        .create(payload)
        .await
        .map_err(to_api)?;

    Ok(ApiResponse::created(invoice)
        .with_message(app_state.i18n_store.translate(&locale.0, "invoice.created")))
}

#[utoipa::path(
    put,
    path = "/api/invoices",
    tag = "Invoices",
    params(IdQuery),
    request_body = InvoicePayload,
    responses(
        (status = 200, description = "Invoice atualizada", body = InvoiceDetail),
        (status = 400, description = "ID ausente ou dados inválidos"),
        (status = 404, description = "Invoice não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invoice_by_query(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Query(query): Query<IdQuery>,
    payload: Result<Json<InvoicePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = replace(&app_state, query.id.as_deref(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(invoice)
        .with_message(app_state.i18n_store.translate(&locale.0, "invoice.updated")))
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = String, Path, description = "UUID da invoice")),
    request_body = InvoicePayload,
    responses(
        (status = 200, description = "Invoice atualizada", body = InvoiceDetail),
        (status = 400, description = "ID inválido ou dados inválidos"),
        (status = 404, description = "Invoice não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<InvoicePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = replace(&app_state, Some(&id), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(invoice)
        .with_message(app_state.i18n_store.translate(&locale.0, "invoice.updated")))
}

#[utoipa::path(
    delete,
    path = "/api/invoices",
    tag = "Invoices",
    params(IdQuery),
    responses(
        (status = 200, description = "Invoice removida"),
        (status = 400, description = "ID ausente"),
        (status = 404, description = "Invoice não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice_by_query(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Query(query): Query<IdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    remove(&app_state, query.id.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::message_only(
        app_state.i18n_store.translate(&locale.0, "invoice.deleted"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = String, Path, description = "UUID da invoice")),
    responses(
        (status = 200, description = "Invoice removida"),
        (status = 400, description = "ID inválido"),
        (status = 404, description = "Invoice não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    remove(&app_state, Some(&id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::message_only(
        app_state.i18n_store.translate(&locale.0, "invoice.deleted"),
    ))
}
