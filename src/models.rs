pub mod auth;
pub mod invoice;
pub mod passkey;
pub mod project;
