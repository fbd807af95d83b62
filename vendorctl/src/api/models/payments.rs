//! API request/response models for payments and the payments dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::models::subscriptions::SubscriptionBucket;
use crate::api::models::suppliers::{PaymentStatus, SupplierStatus};
use crate::db::models::payments::PaymentDBResponse;
use crate::db::models::suppliers::SupplierDBResponse;
use crate::types::{PaymentId, PlanId, SupplierId};

/// Request to start a checkout session for a subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[schema(value_type = String, format = "uuid")]
    pub plan_id: PlanId,
    /// Where the gateway redirects after a successful payment
    pub success_url: String,
    /// Where the gateway redirects if the customer backs out
    pub cancel_url: String,
}

/// A created checkout session: the client redirects to `checkout_url`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub checkout_url: String,
}

/// A recorded, confirmed payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PaymentId,
    #[schema(value_type = String, format = "uuid")]
    pub supplier_id: SupplierId,
    pub source_id: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub duration_years: i32,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentDBResponse> for PaymentResponse {
    fn from(p: PaymentDBResponse) -> Self {
        Self {
            id: p.id,
            supplier_id: p.supplier_id,
            source_id: p.source_id,
            amount: p.amount,
            duration_years: p.duration_years,
            created_at: p.created_at,
        }
    }
}

/// Query parameters for the admin payments dashboard.
///
/// Search, payment status, business type, and payment-date range are applied
/// in SQL; the derived `subscription` bucket filter is applied after fetch
/// because it depends on the current time.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DashboardParams {
    /// Substring match against company name, contact name, email, and reference
    pub search: Option<String>,
    /// Supplier review status filter
    pub status: Option<SupplierStatus>,
    pub business_type: Option<String>,
    /// Inclusive lower bound on payment date
    pub payment_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on payment date
    pub payment_to: Option<DateTime<Utc>>,
    /// Derived subscription bucket filter
    pub subscription: Option<SubscriptionBucket>,
}

/// One row of the payments dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardRow {
    #[schema(value_type = String, format = "uuid")]
    pub supplier_id: SupplierId,
    pub reference: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub business_type: String,
    pub status: SupplierStatus,
    pub payment_status: PaymentStatus,
    #[schema(value_type = Option<f64>)]
    pub payment_amount: Option<Decimal>,
    pub payment_date: Option<DateTime<Utc>>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub subscription: SubscriptionBucket,
}

impl DashboardRow {
    pub fn from_supplier(supplier: SupplierDBResponse, now: DateTime<Utc>) -> Self {
        let subscription = SubscriptionBucket::for_supplier(&supplier, now);
        Self {
            supplier_id: supplier.id,
            reference: supplier.reference,
            company_name: supplier.company_name,
            contact_name: supplier.contact_name,
            email: supplier.email,
            business_type: supplier.business_type,
            status: supplier.status,
            payment_status: supplier.payment_status,
            payment_amount: supplier.payment_amount,
            payment_date: supplier.payment_date,
            subscription_expires_at: supplier.subscription_expires_at,
            subscription,
        }
    }
}

/// Bucket counts over the filtered (pre-pagination) dashboard rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub active: i64,
    pub expiring_soon: i64,
    pub expired: i64,
    pub no_subscription: i64,
}

impl DashboardSummary {
    pub fn tally(rows: impl IntoIterator<Item = SubscriptionBucket>) -> Self {
        let mut summary = Self::default();
        for bucket in rows {
            match bucket {
                SubscriptionBucket::Active => summary.active += 1,
                SubscriptionBucket::ExpiringSoon => summary.expiring_soon += 1,
                SubscriptionBucket::Expired => summary.expired += 1,
                SubscriptionBucket::NoSubscription => summary.no_subscription += 1,
            }
        }
        summary
    }
}

/// Payments dashboard payload: paginated rows plus bucket counts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub data: Vec<DashboardRow>,
    pub total_count: i64,
    pub skip: i64,
    pub limit: i64,
    pub summary: DashboardSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_tally() {
        let summary = DashboardSummary::tally([
            SubscriptionBucket::Active,
            SubscriptionBucket::Active,
            SubscriptionBucket::Expired,
            SubscriptionBucket::NoSubscription,
        ]);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.expiring_soon, 0);
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.no_subscription, 1);
    }
}
