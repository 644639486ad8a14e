// src/handlers/health.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{config::AppState, middleware::i18n::Locale};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "OK")]
    pub status: String,
    pub message: String,
    #[schema(example = "Connected")]
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "API no ar", body = HealthResponse))
)]
pub async fn health(State(app_state): State<AppState>, locale: Locale) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&app_state.db_pool).await {
        Ok(_) => "Connected",
        Err(e) => {
            tracing::warn!("Health check sem banco: {}", e);
            "Disconnected"
        }
    };

    Json(HealthResponse {
        status: "OK".to_string(),
        message: app_state.i18n_store.translate(&locale.0, "health.ok"),
        database: database.to_string(),
    })
}
