// src/routes.rs

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// CORS a partir de `CORS_ORIGIN`. `*` libera qualquer origem, sem credenciais.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT_LANGUAGE])
        .max_age(Duration::from_secs(3600));

    if origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Origem CORS inválida '{}': {}", origin, e);
                None
            }
        })
        .collect();

    base.allow_origin(origins).allow_credentials(true)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::auth::login).get(handlers::auth::verify))
        .route("/login", post(handlers::auth::login))
        .route("/verify", get(handlers::auth::verify))
        .route("/passkey/register-options", post(handlers::passkey::register_options))
        .route("/passkey/register-verify", post(handlers::passkey::register_verify))
        .route("/passkey/auth-options", post(handlers::passkey::auth_options))
        .route("/passkey/auth-verify", post(handlers::passkey::auth_verify))
}

fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::invoices::get_invoices)
                .post(handlers::invoices::create_invoice)
                .put(handlers::invoices::update_invoice_by_query)
                .delete(handlers::invoices::delete_invoice_by_query),
        )
        .route("/next-number", get(handlers::invoices::next_number))
        .route(
            "/{id}",
            get(handlers::invoices::get_invoice)
                .put(handlers::invoices::update_invoice)
                .delete(handlers::invoices::delete_invoice),
        )
}

fn portfolio_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::portfolio::get_portfolio)
                .post(handlers::portfolio::create_project)
                .put(handlers::portfolio::update_project_by_query)
                .delete(handlers::portfolio::delete_project_by_query),
        )
        .route("/migrate", post(handlers::portfolio::migrate_portfolio))
        .route(
            "/{id}",
            get(handlers::portfolio::get_project)
                .put(handlers::portfolio::update_project)
                .delete(handlers::portfolio::delete_project),
        )
}

/// Router completo com as camadas. Usado pelo binário e pelos testes.
pub fn app(app_state: AppState) -> Router {
    let cors = build_cors_layer(&app_state.config.cors_origins);
    let body_limit = app_state.config.body_limit_bytes;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::health::health))
        .route("/api/upload", post(handlers::upload::upload_file))
        .nest("/api/auth", auth_routes())
        .nest("/api/invoices", invoice_routes())
        .nest("/api/portfolio", portfolio_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(app_state)
}
