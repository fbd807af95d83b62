//! API request/response models for contact inquiries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::contact_inquiries::ContactInquiryDBResponse;
use crate::errors::Error;
use crate::types::InquiryId;

/// Contact form payload from the marketing site.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactInquiryCreate {
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub message: String,
}

impl ContactInquiryCreate {
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation {
                    message: format!("Missing required field: {field}"),
                });
            }
        }
        if !self.email.trim().contains('@') {
            return Err(Error::Validation {
                message: "Invalid email address".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactInquiryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: InquiryId,
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContactInquiryDBResponse> for ContactInquiryResponse {
    fn from(i: ContactInquiryDBResponse) -> Self {
        Self {
            id: i.id,
            name: i.name,
            company: i.company,
            email: i.email,
            message: i.message,
            created_at: i.created_at,
        }
    }
}
