//! Database models for subscription plans and the singleton settings row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::api::models::settings::PlanCreate;
use crate::types::PlanId;

/// Database request for creating a subscription plan
#[derive(Debug, Clone)]
pub struct PlanCreateDBRequest {
    pub label: String,
    pub duration_years: i32,
    pub price: Decimal,
    pub active: bool,
}

impl From<PlanCreate> for PlanCreateDBRequest {
    fn from(api: PlanCreate) -> Self {
        Self {
            label: api.label,
            duration_years: api.duration_years,
            price: api.price,
            active: api.active.unwrap_or(true),
        }
    }
}

/// Database request for updating a subscription plan
#[derive(Debug, Clone, Default)]
pub struct PlanUpdateDBRequest {
    pub label: Option<String>,
    pub duration_years: Option<i32>,
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

/// Database response for a subscription plan (matches the `subscription_plans` table row)
#[derive(Debug, Clone, FromRow)]
pub struct PlanDBResponse {
    pub id: PlanId,
    pub label: String,
    pub duration_years: i32,
    pub price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The singleton subscription settings row
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionSettingsDBResponse {
    pub registration_fee: Decimal,
    pub updated_at: DateTime<Utc>,
}
