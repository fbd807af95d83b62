//! API request/response models for subscription plans and settings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::subscription_plans::{PlanDBResponse, SubscriptionSettingsDBResponse};
use crate::errors::Error;
use crate::types::PlanId;

/// Admin request to create a subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanCreate {
    /// Display label, e.g. "1 Year"
    pub label: String,
    pub duration_years: i32,
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Defaults to active
    pub active: Option<bool>,
}

impl PlanCreate {
    pub fn validate(&self) -> Result<(), Error> {
        if self.label.trim().is_empty() {
            return Err(Error::Validation {
                message: "Plan label is required".to_string(),
            });
        }
        if self.duration_years <= 0 {
            return Err(Error::Validation {
                message: "Plan duration must be at least one year".to_string(),
            });
        }
        if self.price < Decimal::ZERO {
            return Err(Error::Validation {
                message: "Plan price cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Admin request to update a subscription plan. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PlanUpdate {
    pub label: Option<String>,
    pub duration_years: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PlanId,
    pub label: String,
    pub duration_years: i32,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanDBResponse> for PlanResponse {
    fn from(p: PlanDBResponse) -> Self {
        Self {
            id: p.id,
            label: p.label,
            duration_years: p.duration_years,
            price: p.price,
            active: p.active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// The singleton subscription settings record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionSettingsResponse {
    #[schema(value_type = f64)]
    pub registration_fee: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionSettingsDBResponse> for SubscriptionSettingsResponse {
    fn from(s: SubscriptionSettingsDBResponse) -> Self {
        Self {
            registration_fee: s.registration_fee,
            updated_at: s.updated_at,
        }
    }
}

/// Admin request to change the one-off registration fee.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionSettingsUpdate {
    #[schema(value_type = f64)]
    pub registration_fee: Decimal,
}

/// Active plans plus the registration fee, as shown on the payment page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicPlansResponse {
    pub plans: Vec<PlanResponse>,
    #[schema(value_type = f64)]
    pub registration_fee: Decimal,
}
