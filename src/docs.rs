// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::verify,

        // --- Passkeys ---
        handlers::passkey::register_options,
        handlers::passkey::register_verify,
        handlers::passkey::auth_options,
        handlers::passkey::auth_verify,

        // --- Invoices ---
        handlers::invoices::get_invoices,
        handlers::invoices::get_invoice,
        handlers::invoices::next_number,
        handlers::invoices::create_invoice,
        handlers::invoices::update_invoice_by_query,
        handlers::invoices::update_invoice,
        handlers::invoices::delete_invoice_by_query,
        handlers::invoices::delete_invoice,

        // --- Portfolio ---
        handlers::portfolio::get_portfolio,
        handlers::portfolio::get_project,
        handlers::portfolio::create_project,
        handlers::portfolio::migrate_portfolio,
        handlers::portfolio::update_project_by_query,
        handlers::portfolio::update_project,
        handlers::portfolio::delete_project_by_query,
        handlers::portfolio::delete_project,

        // --- Upload ---
        handlers::upload::upload_file,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Claims,
            models::auth::LoginPayload,
            models::auth::AdminProfile,
            models::auth::AuthResponse,
            models::auth::VerifyResponse,
            models::passkey::RegistrationVerified,

            // --- Invoices ---
            models::invoice::PaymentStatus,
            models::invoice::LineItem,
            models::invoice::Invoice,
            models::invoice::InvoiceDetail,
            models::invoice::InvoicePayload,
            handlers::invoices::NextInvoiceNumber,

            // --- Portfolio ---
            models::project::Category,
            models::project::Pinned,
            models::project::ProjectInfo,
            models::project::Project,
            models::project::ProjectPayload,
            models::project::MigrationReport,

            // --- Upload / Health ---
            handlers::upload::UploadResponse,
            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Status da API"),
        (name = "Auth", description = "Login do admin por senha"),
        (name = "Passkeys", description = "Login do admin por WebAuthn"),
        (name = "Invoices", description = "Invoices dos clientes"),
        (name = "Portfolio", description = "Projetos da galeria"),
        (name = "Upload", description = "Envio de arquivos para o blob storage")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
