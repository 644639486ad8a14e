pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod passkey_repo;
pub use passkey_repo::PasskeyRepository;
