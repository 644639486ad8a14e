// src/services/invoice_service.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InvoiceRepository,
    models::invoice::{InvoiceDetail, InvoicePayload},
};

/// Número sugerido para uma nova invoice: `INV/{ano}/{mês}/{millis}-{0..999}`.
pub fn next_invoice_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().as_u128() % 1000;
    format!(
        "INV/{}/{}-{}",
        now.format("%Y/%m"),
        now.timestamp_millis(),
        suffix
    )
}

pub fn parse_invoice_id(raw: &str) -> Result<Uuid, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::InvoiceIdRequired);
    }
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInvoiceId)
}

#[derive(Clone)]
pub struct InvoiceService {
    repo: InvoiceRepository,
}

impl InvoiceService {
    pub fn new(repo: InvoiceRepository) -> Self {
        Self { repo }
    }

    pub async fn get(&self, id: Uuid) -> Result<InvoiceDetail, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(InvoiceDetail::from)
            .ok_or(AppError::InvoiceNotFound)
    }

    pub async fn list(&self) -> Result<Vec<InvoiceDetail>, AppError> {
        let invoices = self.repo.list_all().await?;
        Ok(invoices.into_iter().map(InvoiceDetail::from).collect())
    }

    pub async fn create(&self, payload: InvoicePayload) -> Result<InvoiceDetail, AppError> {
        let record = payload.into_record()?;
        let invoice = self.repo.create(&record).await?;

        tracing::info!(
            "🧾 Invoice {} criada para {} (total {})",
            invoice.invoice_number,
            invoice.client_name,
            invoice.total
        );
        Ok(invoice.into())
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: InvoicePayload,
    ) -> Result<InvoiceDetail, AppError> {
        let record = payload.into_record()?;
        self.repo
            .update(id, &record)
            .await?
            .map(InvoiceDetail::from)
            .ok_or(AppError::InvoiceNotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::InvoiceNotFound);
        }
        tracing::info!("🗑️ Invoice {} removida", id);
        Ok(())
    }
}
