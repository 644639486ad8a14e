pub mod auth;
pub mod health;
pub mod invoices;
pub mod passkey;
pub mod portfolio;
pub mod upload;
