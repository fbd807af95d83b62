use crate::db::errors::DbError;
use crate::types::Operation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// User lacks required permissions for the operation
    #[error("Insufficient permissions to {action} {resource}")]
    InsufficientPermissions { action: Operation, resource: String },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Request fields failed validation
    #[error("{message}")]
    Validation { message: String },

    /// Authenticated, but the action is not allowed in the current state
    #[error("{message}")]
    Forbidden { message: String },

    /// Request conflicts with current resource state
    #[error("{message}")]
    Conflict { message: String },

    /// Upstream payment gateway failure
    #[error("Payment gateway error: {message}")]
    Gateway { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Subscription payment must be completed before the resource is available
    #[error("{message}")]
    PaymentRequired { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Gateway { .. } => StatusCode::BAD_GATEWAY,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::PaymentRequired { .. } => StatusCode::PAYMENT_REQUIRED,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message
                .clone()
                .unwrap_or_else(|| "Authentication required".to_string()),
            Error::InsufficientPermissions { action, resource } => {
                format!("Insufficient permissions to {action} {resource}")
            }
            Error::BadRequest { message } => message.clone(),
            Error::Validation { message } => message.clone(),
            Error::Forbidden { message } => message.clone(),
            Error::Conflict { message } => message.clone(),
            Error::Gateway { .. } => "Payment gateway is temporarily unavailable".to_string(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::PaymentRequired { message } => message.clone(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, .. } => match constraint.as_deref() {
                    Some("suppliers_email_unique") => {
                        "A supplier with this email address is already registered".to_string()
                    }
                    Some("users_email_unique") => {
                        "An account with this email address already exists. Use password reset to regain access."
                            .to_string()
                    }
                    Some("payments_source_id_unique") => {
                        "This payment has already been recorded".to_string()
                    }
                    Some("category_items_category_name_unique") => {
                        "This option already exists in the category".to_string()
                    }
                    Some("subscription_plans_label_unique") => {
                        "A plan with this label already exists".to_string()
                    }
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => {
                    "Invalid reference to related resource".to_string()
                }
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) | Error::Gateway { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InsufficientPermissions { .. } | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::Validation { .. } | Error::Conflict { .. } | Error::NotFound { .. } | Error::PaymentRequired { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        match &self {
            // Unique violations get a structured body so the registration form
            // can tell "this email is taken" apart from other conflicts
            Error::Database(DbError::UniqueViolation {
                constraint,
                conflicting_value,
                ..
            }) => {
                use serde_json::json;

                let resource = match constraint.as_deref() {
                    Some("suppliers_email_unique") => "supplier",
                    Some("users_email_unique") => "user",
                    Some("payments_source_id_unique") => "payment",
                    Some("category_items_category_name_unique") => "category_item",
                    Some("subscription_plans_label_unique") => "plan",
                    _ => "unknown",
                };

                let mut body = json!({
                    "message": self.user_message(),
                    "resource": resource,
                });
                if let Some(value) = conflicting_value {
                    body["conflicting_value"] = json!(value);
                }

                (status, axum::response::Json(body)).into_response()
            }
            // The payment gate gets a machine-readable marker so the frontend
            // can route straight to checkout
            Error::PaymentRequired { .. } => {
                use serde_json::json;

                let body = json!({
                    "error": "payment_required",
                    "message": self.user_message(),
                });

                (status, axum::response::Json(body)).into_response()
            }
            _ => {
                let user_message = self.user_message();
                (status, user_message).into_response()
            }
        }
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

impl From<crate::payment_providers::PaymentError> for Error {
    fn from(err: crate::payment_providers::PaymentError) -> Self {
        use crate::payment_providers::PaymentError;
        match err {
            PaymentError::ProviderApi(message) => Error::Gateway { message },
            PaymentError::PaymentNotCompleted => Error::PaymentRequired {
                message: "Payment has not been completed".to_string(),
            },
            PaymentError::InvalidData(message) => Error::BadRequest { message },
            PaymentError::Database(e) => Error::Database(e.into()),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::PaymentRequired {
                message: "pay first".to_string()
            }
            .status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            Error::Database(DbError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Database(DbError::UniqueViolation {
                constraint: Some("suppliers_email_unique".to_string()),
                table: Some("suppliers".to_string()),
                message: "duplicate key".to_string(),
                conflicting_value: None,
            })
            .status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_duplicate_email_message() {
        let err = Error::Database(DbError::UniqueViolation {
            constraint: Some("suppliers_email_unique".to_string()),
            table: Some("suppliers".to_string()),
            message: "duplicate key".to_string(),
            conflicting_value: Some("jo@acme.example".to_string()),
        });
        assert!(err.user_message().contains("already registered"));
    }
}
