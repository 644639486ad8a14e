pub mod auth;
pub mod blob;
pub mod invoice_service;
pub mod passkey_service;
pub mod portfolio_service;
