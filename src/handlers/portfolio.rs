// src/handlers/portfolio.rs

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::{
    common::{
        error::{ApiError, AppError},
        response::ApiResponse,
    },
    config::AppState,
    middleware::{auth::AdminUser, i18n::Locale},
    models::project::{Category, MigrationReport, Project, ProjectKey, ProjectPayload},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PortfolioQuery {
    /// UUID ou ID legado do projeto
    pub id: Option<String>,
    /// Filtra a listagem por categoria
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectIdQuery {
    pub id: Option<String>,
}

fn project_key(raw: Option<&str>) -> Result<ProjectKey, AppError> {
    ProjectKey::parse(raw.unwrap_or_default())
}

// POST aceita `{ "action": "migrate" }` no lugar de um projeto
fn is_migrate_action(body: &Value) -> bool {
    body.get("action").and_then(Value::as_str) == Some("migrate")
}

async fn run_migration(app_state: &AppState, locale: &Locale) -> Result<Response, AppError> {
    let report = app_state.portfolio_service.migrate().await?;
    let message = app_state.i18n_store.translate_with(
        &locale.0,
        "project.migrated",
        &[("count", report.inserted.to_string())],
    );
    Ok(ApiResponse::ok(report).with_message(message).into_response())
}

async fn replace(
    app_state: &AppState,
    raw_id: Option<&str>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> Result<Project, AppError> {
    let key = project_key(raw_id)?;
    let Json(payload) = payload?;
    app_state.portfolio_service.update(&key, payload).await
}

async fn remove(app_state: &AppState, raw_id: Option<&str>) -> Result<(), AppError> {
    let key = project_key(raw_id)?;
    app_state.portfolio_service.delete(&key).await
}

// ---
// Handlers
// ---

/// Listagem pública (fixados primeiro) ou um projeto com `?id=`.
#[utoipa::path(
    get,
    path = "/api/portfolio",
    tag = "Portfolio",
    params(PortfolioQuery),
    responses(
        (status = 200, description = "Projetos, fixados primeiro", body = Vec<Project>),
        (status = 404, description = "Projeto não encontrado")
    )
)]
pub async fn get_portfolio(
    State(app_state): State<AppState>,
    locale: Locale,
    query: Result<Query<PortfolioQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let Query(query) = query.map_err(|e| to_api(e.into()))?;

    if let Some(raw_id) = query.id.as_deref() {
        let key = ProjectKey::parse(raw_id).map_err(to_api)?;
        let project = app_state.portfolio_service.get(&key).await.map_err(to_api)?;
        return Ok(ApiResponse::ok(project).into_response());
    }

    let projects = app_state
        .portfolio_service
        .list(query.category)
        .await
        .map_err(to_api)?;
    Ok(ApiResponse::ok(projects).into_response())
}

#[utoipa::path(
    get,
    path = "/api/portfolio/{id}",
    tag = "Portfolio",
    params(("id" = String, Path, description = "UUID ou ID legado")),
    responses(
        (status = 200, description = "Projeto", body = Project),
        (status = 404, description = "Projeto não encontrado")
    )
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let project = async {
        let key = ProjectKey::parse(&id)?;
        app_state.portfolio_service.get(&key).await
    }
    .await
    .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(project))
}

#[utoipa::path(
    post,
    path = "/api/portfolio",
    tag = "Portfolio",
    request_body = ProjectPayload,
    responses(
        (status = 201, description = "Projeto criado", body = Project),
        (status = 200, description = "Migração executada (`{\"action\":\"migrate\"}`)", body = MigrationReport),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let Json(body) = payload.map_err(|e| to_api(e.into()))?;

    if is_migrate_action(&body) {
        return run_migration(&app_state, &locale).await.map_err(to_api);
    }

    let payload: ProjectPayload = serde_json::from_value(body)
        .map_err(|e| to_api(AppError::MalformedBody(e.to_string())))?;

    let project = app_state
        .portfolio_service
        .create(payload)
        .await
        .map_err(to_api)?;

    Ok(ApiResponse::created(project)
        .with_message(app_state.i18n_store.translate(&locale.0, "project.created"))
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/portfolio/migrate",
    tag = "Portfolio",
    responses(
        (status = 200, description = "Migração executada", body = MigrationReport),
        (status = 404, description = "Fixture não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn migrate_portfolio(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
) -> Result<Response, ApiError> {
    run_migration(&app_state, &locale)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))
}

#[utoipa::path(
    put,
    path = "/api/portfolio",
    tag = "Portfolio",
    params(ProjectIdQuery),
    request_body = ProjectPayload,
    responses(
        (status = 200, description = "Projeto atualizado", body = Project),
        (status = 400, description = "ID ausente ou dados inválidos"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project_by_query(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Query(query): Query<ProjectIdQuery>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let project = replace(&app_state, query.id.as_deref(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(project)
        .with_message(app_state.i18n_store.translate(&locale.0, "project.updated")))
}

#[utoipa::path(
    put,
    path = "/api/portfolio/{id}",
    tag = "Portfolio",
    params(("id" = String, Path, description = "UUID ou ID legado")),
    request_body = ProjectPayload,
    responses(
        (status = 200, description = "Projeto atualizado", body = Project),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let project = replace(&app_state, Some(&id), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(project)
        .with_message(app_state.i18n_store.translate(&locale.0, "project.updated")))
}

/// Remove o projeto e, antes, os arquivos dele no blob (melhor esforço).
#[utoipa::path(
    delete,
    path = "/api/portfolio",
    tag = "Portfolio",
    params(ProjectIdQuery),
    responses(
        (status = 200, description = "Projeto removido"),
        (status = 400, description = "ID ausente"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project_by_query(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Query(query): Query<ProjectIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    remove(&app_state, query.id.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::message_only(
        app_state.i18n_store.translate(&locale.0, "project.deleted"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/portfolio/{id}",
    tag = "Portfolio",
    params(("id" = String, Path, description = "UUID ou ID legado")),
    responses(
        (status = 200, description = "Projeto removido"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    remove(&app_state, Some(&id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::message_only(
        app_state.i18n_store.translate(&locale.0, "project.deleted"),
    ))
}
