// src/models/invoice.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::error::AppError;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status")]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "BELUM LUNAS")]
    #[sqlx(rename = "BELUM LUNAS")]
    Unpaid, // Belum lunas

    #[serde(rename = "DP")]
    #[sqlx(rename = "DP")]
    DownPayment, // Pagou o sinal

    #[serde(rename = "LUNAS")]
    #[sqlx(rename = "LUNAS")]
    Paid, // Quitado
}

// ---
// Validação Customizada
// ---

/// Casas decimais guardadas nas colunas de valor (`NUMERIC(16, 2)`).
pub const MONEY_SCALE: u32 = 2;

/// Maior valor que cabe em `NUMERIC(16, 2)`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_874_919_423, 2_328_306, 0, false, MONEY_SCALE);

/// Quantidade máxima por item.
pub const MAX_QUANTITY: i64 = 1_000_000;

pub(crate) fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if val.normalize().scale() > MONEY_SCALE {
        let mut err = ValidationError::new("scale");
        err.add_param("max".into(), &MONEY_SCALE);
        err.message = Some("O valor aceita no máximo 2 casas decimais.".into());
        return Err(err);
    }
    if *val > MAX_AMOUNT {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &MAX_AMOUNT.to_string());
        err.message = Some("O valor é grande demais.".into());
        return Err(err);
    }
    Ok(())
}

fn total_too_large() -> AppError {
    let mut err = ValidationError::new("range");
    err.add_param("max".into(), &MAX_AMOUNT.to_string());
    err.message = Some("O total da invoice é grande demais.".into());

    let mut errors = ValidationErrors::new();
    errors.add("items", err);
    AppError::ValidationError(errors)
}

// Aceita "2025-01-15T00:00:00.000Z" (o que o form envia) e também "2025-01-15"
fn deserialize_invoice_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(datetime) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("data inválida: {}", raw)))
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[validate(length(min = 1, message = "A descrição do item é obrigatória."))]
    #[schema(example = "Edit")]
    pub description: String,

    #[validate(range(
        min = 1,
        max = MAX_QUANTITY,
        message = "A quantidade deve ficar entre 1 e 1.000.000."
    ))]
    #[schema(example = 2)]
    pub quantity: i64,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "500000")]
    pub price: Decimal,
}

impl LineItem {
    /// `None` se a multiplicação estourar.
    pub fn amount(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }
}

/// Subtotal e total calculados no servidor. Não há impostos nem descontos,
/// então os dois são sempre iguais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Soma com aritmética checada; um total que não cabe na coluna é
    /// erro de validação.
    pub fn from_items(items: &[LineItem]) -> Result<Self, AppError> {
        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.amount()?))
            .filter(|subtotal| *subtotal <= MAX_AMOUNT)
            .ok_or_else(total_too_large)?;

        Ok(Self {
            subtotal,
            total: subtotal,
        })
    }
}

/// Quanto falta pagar, dado o status.
pub fn balance_due(status: PaymentStatus, total: Decimal, dp_amount: Decimal) -> Decimal {
    match status {
        PaymentStatus::Paid => Decimal::ZERO,
        PaymentStatus::DownPayment => (total - dp_amount).max(Decimal::ZERO),
        PaymentStatus::Unpaid => total,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,

    #[schema(example = "INV/2025/01/1736899200000-42")]
    pub invoice_number: String,

    pub invoice_date: DateTime<Utc>,

    #[schema(example = "PT Kopi Kita")]
    pub client_name: String,
    pub client_address: String,

    #[schema(example = "Company Profile 2025")]
    pub project_title: String,

    #[schema(value_type = Vec<LineItem>)]
    pub items: Json<Vec<LineItem>>,

    #[schema(example = "1000000")]
    pub subtotal: Decimal,
    #[schema(example = "1000000")]
    pub total: Decimal,

    pub payment_status: PaymentStatus,
    pub dp_amount: Decimal,
    pub notes: String,

    // data:image/png;base64,...
    pub signature: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn balance_due(&self) -> Decimal {
        balance_due(self.payment_status, self.total, self.dp_amount)
    }
}

// Invoice + campos derivados, como sai na API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub balance_due: Decimal,
}

impl From<Invoice> for InvoiceDetail {
    fn from(invoice: Invoice) -> Self {
        let balance_due = invoice.balance_due();
        Self { invoice, balance_due }
    }
}

// Payload de criação/atualização. `subtotal`/`total` enviados pelo cliente
// são ignorados: sempre recalculamos a partir dos itens.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    #[validate(length(min = 1, message = "O número da invoice é obrigatório."))]
    pub invoice_number: String,

    #[serde(deserialize_with = "deserialize_invoice_date")]
    #[schema(value_type = String, format = DateTime, example = "2025-01-15T00:00:00.000Z")]
    pub invoice_date: DateTime<Utc>,

    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    pub client_name: String,

    #[serde(default)]
    pub client_address: String,

    #[validate(length(min = 1, message = "O título do projeto é obrigatório."))]
    pub project_title: String,

    #[validate(length(min = 1, message = "A invoice precisa de pelo menos um item."), nested)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    #[serde(default)]
    #[validate(custom(function = "validate_money"))]
    pub dp_amount: Decimal,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub signature: Option<String>,
}

// O que de fato vai para o banco, já com os totais calculados
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub invoice_number: String,
    pub invoice_date: DateTime<Utc>,
    pub client_name: String,
    pub client_address: String,
    pub project_title: String,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    pub dp_amount: Decimal,
    pub notes: String,
    pub signature: Option<String>,
}

impl InvoicePayload {
    /// Valida e transforma o payload no registro a ser gravado.
    /// O DP só é guardado quando o status é `DP`, e não pode passar do total.
    pub fn into_record(self) -> Result<InvoiceRecord, AppError> {
        self.validate()?;

        let totals = InvoiceTotals::from_items(&self.items)?;

        let dp_amount = match self.payment_status {
            PaymentStatus::DownPayment => {
                if self.dp_amount > totals.total {
                    return Err(AppError::DownPaymentExceedsTotal);
                }
                self.dp_amount
            }
            _ => Decimal::ZERO,
        };

        Ok(InvoiceRecord {
            invoice_number: self.invoice_number.trim().to_string(),
            invoice_date: self.invoice_date,
            client_name: self.client_name,
            client_address: self.client_address,
            project_title: self.project_title,
            items: self.items,
            subtotal: totals.subtotal,
            total: totals.total,
            payment_status: self.payment_status,
            dp_amount,
            notes: self.notes,
            signature: self.signature.filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(body: serde_json::Value) -> InvoicePayload {
        serde_json::from_value(body).expect("payload válido")
    }

    fn base_body() -> serde_json::Value {
        json!({
            "invoiceNumber": "INV/2025/01/1-1",
            "invoiceDate": "2025-01-15T00:00:00.000Z",
            "clientName": "Rina",
            "projectTitle": "Wedding",
            "items": [{ "description": "Edit", "quantity": 2, "price": 500000 }]
        })
    }

    #[test]
    fn totals_are_the_sum_of_quantity_times_price() {
        let record = payload(base_body()).into_record().unwrap();

        assert_eq!(record.subtotal, Decimal::from(1_000_000));
        assert_eq!(record.total, Decimal::from(1_000_000));
    }

    #[test]
    fn client_supplied_totals_are_ignored() {
        let mut body = base_body();
        body["subtotal"] = json!(1);
        body["total"] = json!(999);
        body["items"] = json!([
            { "description": "Edit", "quantity": 3, "price": 250000 },
            { "description": "Color grading", "quantity": 1, "price": 150000 }
        ]);

        let record = payload(body).into_record().unwrap();
        let expected = Decimal::from(900_000);

        assert_eq!(record.subtotal, expected);
        assert_eq!(record.total, record.subtotal);
    }

    #[test]
    fn totals_hold_for_many_item_combinations() {
        for quantity in 1..=5_i64 {
            for price in [0_i64, 1, 99_999, 1_250_000] {
                let items = vec![
                    LineItem {
                        description: "A".into(),
                        quantity,
                        price: Decimal::from(price),
                    },
                    LineItem {
                        description: "B".into(),
                        quantity: quantity + 1,
                        price: Decimal::from(price / 2),
                    },
                ];
                let totals = InvoiceTotals::from_items(&items).unwrap();
                let expected = Decimal::from(quantity * price + (quantity + 1) * (price / 2));
                assert_eq!(totals.subtotal, expected);
                assert_eq!(totals.total, totals.subtotal);
            }
        }
    }

    #[test]
    fn fractional_prices_keep_totals_exact() {
        let mut body = base_body();
        body["items"] = json!([
            { "description": "Revisi", "quantity": 3, "price": 0.35 },
            { "description": "Musik", "quantity": 1, "price": 12500.05 }
        ]);

        let record = payload(body).into_record().unwrap();
        assert_eq!(record.subtotal, Decimal::new(1_250_110, 2));
        assert_eq!(record.total, record.subtotal);
    }

    #[test]
    fn prices_with_more_than_two_decimals_are_rejected() {
        let mut body = base_body();
        body["items"] = json!([{ "description": "Edit", "quantity": 1, "price": 0.335 }]);

        let Err(AppError::ValidationError(errors)) = payload(body).into_record() else {
            panic!("esperava erro de validação");
        };
        assert!(errors.errors().contains_key("items"));
    }

    #[test]
    fn oversized_item_is_rejected_instead_of_overflowing() {
        let mut body = base_body();
        body["items"] = json!([
            { "description": "Edit", "quantity": 9_000_000_000_000_000_000_i64, "price": 1e20 }
        ]);

        assert!(matches!(
            payload(body).into_record(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn total_above_column_capacity_is_rejected() {
        let item = LineItem {
            description: "Edit".into(),
            quantity: MAX_QUANTITY,
            price: MAX_AMOUNT,
        };
        assert!(item.validate().is_ok());

        assert!(matches!(
            InvoiceTotals::from_items(&[item]),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn amount_overflow_is_none() {
        let item = LineItem {
            description: "Edit".into(),
            quantity: i64::MAX,
            price: Decimal::MAX,
        };
        assert_eq!(item.amount(), None);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut body = base_body();
        body["items"] = json!([{ "description": "Edit", "quantity": 0, "price": 1 }]);

        assert!(matches!(
            payload(body).into_record(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut body = base_body();
        body["items"] = json!([{ "description": "Edit", "quantity": 1, "price": -10 }]);

        assert!(matches!(
            payload(body).into_record(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let mut body = base_body();
        body["items"] = json!([]);

        assert!(matches!(
            payload(body).into_record(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn down_payment_is_dropped_unless_status_is_dp() {
        let mut body = base_body();
        body["paymentStatus"] = json!("LUNAS");
        body["dpAmount"] = json!(300000);

        let record = payload(body).into_record().unwrap();
        assert_eq!(record.payment_status, PaymentStatus::Paid);
        assert_eq!(record.dp_amount, Decimal::ZERO);
    }

    #[test]
    fn down_payment_cannot_exceed_total() {
        let mut body = base_body();
        body["paymentStatus"] = json!("DP");
        body["dpAmount"] = json!(2_000_000);

        assert!(matches!(
            payload(body).into_record(),
            Err(AppError::DownPaymentExceedsTotal)
        ));
    }

    #[test]
    fn balance_due_follows_status() {
        let total = Decimal::from(1_000_000);
        let dp = Decimal::from(400_000);

        assert_eq!(balance_due(PaymentStatus::Unpaid, total, Decimal::ZERO), total);
        assert_eq!(balance_due(PaymentStatus::DownPayment, total, dp), Decimal::from(600_000));
        assert_eq!(balance_due(PaymentStatus::Paid, total, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn payment_status_uses_indonesian_labels_on_the_wire() {
        assert_eq!(serde_json::to_value(PaymentStatus::Unpaid).unwrap(), json!("BELUM LUNAS"));
        assert_eq!(
            serde_json::from_value::<PaymentStatus>(json!("DP")).unwrap(),
            PaymentStatus::DownPayment
        );
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
    }

    #[test]
    fn invoice_date_accepts_plain_dates() {
        let mut body = base_body();
        body["invoiceDate"] = json!("2025-03-01");

        let parsed = payload(body);
        assert_eq!(parsed.invoice_date.to_rfc3339(), "2025-03-01T00:00:00+00:00");
    }
}
