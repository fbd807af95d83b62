//! Database models for confirmed payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::types::{PaymentId, SupplierId};

/// Database request for recording a confirmed payment
#[derive(Debug, Clone)]
pub struct PaymentCreateDBRequest {
    pub supplier_id: SupplierId,
    /// Gateway checkout session id. Unique, so recording the same session
    /// twice is rejected by the database.
    pub source_id: String,
    pub amount: Decimal,
    pub duration_years: i32,
}

/// Database response for a payment (matches the `payments` table row)
#[derive(Debug, Clone, FromRow)]
pub struct PaymentDBResponse {
    pub id: PaymentId,
    pub supplier_id: SupplierId,
    pub source_id: String,
    pub amount: Decimal,
    pub duration_years: i32,
    pub created_at: DateTime<Utc>,
}
