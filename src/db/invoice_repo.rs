// src/db/invoice_repo.rs

use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::invoice::{Invoice, InvoiceRecord},
};

const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, invoice_date, client_name, client_address,
    project_title, items, subtotal, total, payment_status, dp_amount,
    notes, signature, created_at, updated_at
"#;

// Número de invoice duplicado vira 409
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::InvoiceNumberTaken;
        }
    }
    e.into()
}

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let sql = format!("SELECT {} FROM invoices WHERE id = $1", INVOICE_COLUMNS);
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    // Mais recentes primeiro
    pub async fn list_all(&self) -> Result<Vec<Invoice>, AppError> {
        let sql = format!(
            "SELECT {} FROM invoices ORDER BY created_at DESC, id DESC",
            INVOICE_COLUMNS
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(invoices)
    }

    pub async fn create(&self, record: &InvoiceRecord) -> Result<Invoice, AppError> {
        let sql = format!(
            r#"
            INSERT INTO invoices (
                invoice_number, invoice_date, client_name, client_address,
                project_title, items, subtotal, total, payment_status,
                dp_amount, notes, signature
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(&record.invoice_number)
            .bind(record.invoice_date)
            .bind(&record.client_name)
            .bind(&record.client_address)
            .bind(&record.project_title)
            .bind(Json(&record.items))
            .bind(record.subtotal)
            .bind(record.total)
            .bind(record.payment_status)
            .bind(record.dp_amount)
            .bind(&record.notes)
            .bind(&record.signature)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    /// Substitui a invoice inteira. `None` quando o ID não existe.
    pub async fn update(
        &self,
        id: Uuid,
        record: &InvoiceRecord,
    ) -> Result<Option<Invoice>, AppError> {
        let sql = format!(
            r#"
            UPDATE invoices SET
                invoice_number = $2,
                invoice_date = $3,
                client_name = $4,
                client_address = $5,
                project_title = $6,
                items = $7,
                subtotal = $8,
                total = $9,
                payment_status = $10,
                dp_amount = $11,
                notes = $12,
                signature = $13,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .bind(&record.invoice_number)
            .bind(record.invoice_date)
            .bind(&record.client_name)
            .bind(&record.client_address)
            .bind(&record.project_title)
            .bind(Json(&record.items))
            .bind(record.subtotal)
            .bind(record.total)
            .bind(record.payment_status)
            .bind(record.dp_amount)
            .bind(&record.notes)
            .bind(&record.signature)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    /// Retorna `true` se alguma linha foi apagada.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
