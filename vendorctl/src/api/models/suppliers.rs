//! API request/response models for suppliers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::suppliers::SupplierDBResponse;
use crate::errors::Error;
use crate::types::SupplierId;

/// Lifecycle state of a supplier record.
///
/// Registration creates a supplier in `PendingApproval`. Admin review moves it
/// to `Approved` or `Rejected`. An approved supplier editing its own profile
/// drops back to `PendingReview` until an admin re-approves it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "supplier_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    PendingApproval,
    Approved,
    Rejected,
    PendingReview,
}

/// Whether the supplier has completed subscription payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

/// Public registration payload submitted from the marketing site.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierRegistration {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub city: Option<String>,
    pub business_type: String,
    pub website: Option<String>,
    pub description: Option<String>,
    /// At least one category is required
    pub categories: Vec<String>,
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
}

impl SupplierRegistration {
    /// Validate the registration payload server-side.
    ///
    /// Rejects submissions with missing required fields, an implausible email,
    /// an empty category list, or unaccepted consent checkboxes. Trims
    /// whitespace-only values so `"  "` counts as missing.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("company_name", &self.company_name),
            ("contact_name", &self.contact_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("country", &self.country),
            ("business_type", &self.business_type),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Validation {
                    message: format!("Missing required field: {field}"),
                });
            }
        }

        // Minimal plausibility check; real verification happens when the
        // welcome email is delivered.
        let email = self.email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(Error::Validation {
                message: "Invalid email address".to_string(),
            });
        }

        if self.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(Error::Validation {
                message: "At least one category is required".to_string(),
            });
        }

        if !self.terms_accepted || !self.privacy_accepted {
            return Err(Error::Validation {
                message: "Terms of service and privacy policy must be accepted".to_string(),
            });
        }

        Ok(())
    }
}

/// Admin-side update to a supplier record. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SupplierAdminUpdate {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub business_type: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    /// Editing the subscription duration recomputes the expiry timestamp
    /// from the recorded payment date.
    pub subscription_duration_years: Option<i32>,
}

/// Self-service profile update from a supplier's own dashboard.
///
/// A narrower surface than [`SupplierAdminUpdate`]: suppliers cannot touch
/// their subscription fields, and a successful edit moves the record back to
/// `pending_review`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SupplierProfileUpdate {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub business_type: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
}

/// Rejection payload: the reason is included in the notification email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Query parameters for the admin supplier list.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SupplierListParams {
    /// Substring match against company name, contact name, email, and reference
    pub search: Option<String>,
    /// Exact status filter
    pub status: Option<SupplierStatus>,
}

/// Full supplier record as returned to admins.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierResponse {
    #[schema(value_type = String, format = "uuid")]
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
    pub status: SupplierStatus,
    pub rejection_reason: Option<String>,
    pub payment_status: PaymentStatus,
    pub subscription_duration_years: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub payment_amount: Option<Decimal>,
    pub payment_date: Option<DateTime<Utc>>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SupplierDBResponse> for SupplierResponse {
    fn from(s: SupplierDBResponse) -> Self {
        Self {
            id: s.id,
            reference: s.reference,
            company_name: s.company_name,
            contact_name: s.contact_name,
            email: s.email,
            phone: s.phone,
            country: s.country,
            city: s.city,
            business_type: s.business_type,
            website: s.website,
            description: s.description,
            categories: s.categories,
            status: s.status,
            rejection_reason: s.rejection_reason,
            payment_status: s.payment_status,
            subscription_duration_years: s.subscription_duration_years,
            payment_amount: s.payment_amount,
            payment_date: s.payment_date,
            subscription_expires_at: s.subscription_expires_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Response to a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SupplierId,
    /// Human-readable reference quoted in support conversations
    pub reference: String,
    pub status: SupplierStatus,
}

/// Result of an admin approve/reject action.
///
/// The status change and the notification email are not atomic: the status
/// update commits first, and `email_sent` reports whether the notification
/// actually went out so the console can surface delivery failures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewDecisionResponse {
    pub supplier: SupplierResponse,
    pub email_sent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> SupplierRegistration {
        SupplierRegistration {
            company_name: "Acme Trading LLC".to_string(),
            contact_name: "Jo Park".to_string(),
            email: "jo@acme.example".to_string(),
            phone: "+971500000000".to_string(),
            country: "United Arab Emirates".to_string(),
            city: Some("Dubai".to_string()),
            business_type: "Distributor".to_string(),
            website: None,
            description: None,
            categories: vec!["Electronics".to_string()],
            terms_accepted: true,
            privacy_accepted: true,
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let mut reg = valid_registration();
        reg.company_name = "   ".to_string();
        assert!(reg.validate().is_err());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut reg = valid_registration();
        reg.email = "not-an-email".to_string();
        assert!(reg.validate().is_err());
    }

    #[test]
    fn test_empty_categories_rejected() {
        let mut reg = valid_registration();
        reg.categories = vec![];
        assert!(reg.validate().is_err());

        let mut reg = valid_registration();
        reg.categories = vec!["  ".to_string()];
        assert!(reg.validate().is_err());
    }

    #[test]
    fn test_unaccepted_consent_rejected() {
        let mut reg = valid_registration();
        reg.terms_accepted = false;
        assert!(reg.validate().is_err());

        let mut reg = valid_registration();
        reg.privacy_accepted = false;
        assert!(reg.validate().is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&SupplierStatus::PendingApproval).unwrap(),
            "\"pending_approval\""
        );
        assert_eq!(
            serde_json::to_string(&SupplierStatus::PendingReview).unwrap(),
            "\"pending_review\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
