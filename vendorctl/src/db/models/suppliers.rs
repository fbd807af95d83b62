//! Database models for suppliers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::api::models::suppliers::{PaymentStatus, SupplierRegistration, SupplierStatus};
use crate::types::SupplierId;

/// Database request for creating a new supplier
#[derive(Debug, Clone)]
pub struct SupplierCreateDBRequest {
    pub reference: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub city: Option<String>,
    pub business_type: String,
    pub website: Option<String>,
    pub description: Option<String>,
    pub categories: Vec<String>,
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
}

impl SupplierCreateDBRequest {
    /// Build from the public registration payload plus a generated reference string.
    pub fn from_registration(registration: SupplierRegistration, reference: String) -> Self {
        Self {
            reference,
            company_name: registration.company_name,
            contact_name: registration.contact_name,
            email: registration.email,
            phone: registration.phone,
            country: registration.country,
            city: registration.city,
            business_type: registration.business_type,
            website: registration.website,
            description: registration.description,
            categories: registration.categories,
            terms_accepted: registration.terms_accepted,
            privacy_accepted: registration.privacy_accepted,
        }
    }
}

/// Database request for updating a supplier
///
/// All fields are optional; `None` means "leave unchanged". Status transitions
/// and payment completion have dedicated repository methods and do not go
/// through this request.
#[derive(Debug, Clone, Default)]
pub struct SupplierUpdateDBRequest {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub business_type: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub subscription_duration_years: Option<i32>,
}

/// Database response for a supplier (matches the `suppliers` table row)
#[derive(Debug, Clone, FromRow)]
pub struct SupplierDBResponse {
    pub id: SupplierId,
    pub reference: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub city: Option<String>,
    pub business_type: String,
    pub website: Option<String>,
    pub description: Option<String>,
    pub categories: Vec<String>,
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
    pub status: SupplierStatus,
    pub rejection_reason: Option<String>,
    pub payment_status: PaymentStatus,
    pub subscription_duration_years: Option<i32>,
    pub payment_amount: Option<Decimal>,
    pub payment_date: Option<DateTime<Utc>>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub payment_provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data recorded on the supplier row when a checkout session is confirmed paid
#[derive(Debug, Clone)]
pub struct SupplierPaymentCompletion {
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub duration_years: i32,
    pub expires_at: DateTime<Utc>,
}
