//! Database models for contact inquiries.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::models::contact_inquiries::ContactInquiryCreate;
use crate::types::InquiryId;

/// Database request for recording a contact inquiry
#[derive(Debug, Clone)]
pub struct ContactInquiryCreateDBRequest {
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub message: String,
}

impl From<ContactInquiryCreate> for ContactInquiryCreateDBRequest {
    fn from(api: ContactInquiryCreate) -> Self {
        Self {
            name: api.name,
            company: api.company,
            email: api.email,
            message: api.message,
        }
    }
}

/// Database response for a contact inquiry (matches the `contact_inquiries` table row)
#[derive(Debug, Clone, FromRow)]
pub struct ContactInquiryDBResponse {
    pub id: InquiryId,
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
