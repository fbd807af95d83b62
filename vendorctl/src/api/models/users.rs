//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::{SupplierId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role determining what a user can do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supplier,
}

/// The authenticated user attached to a request.
///
/// Extracted from the session cookie by the `CurrentUser` extractor and
/// carried through handlers. `supplier_id` is set for supplier accounts and
/// links the user back to their supplier record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub supplier_id: Option<SupplierId>,
}

impl From<UserDBResponse> for CurrentUser {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            supplier_id: user.supplier_id,
        }
    }
}

// User response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub supplier_id: Option<SupplierId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            supplier_id: user.supplier_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Role::Supplier).unwrap(),
            "\"supplier\""
        );
    }

    #[test]
    fn test_current_user_from_db() {
        let now = Utc::now();
        let supplier_id = uuid::Uuid::new_v4();
        let db_user = UserDBResponse {
            id: uuid::Uuid::new_v4(),
            username: "acme".to_string(),
            email: "owner@acme.example".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: Role::Supplier,
            supplier_id: Some(supplier_id),
            created_at: now,
            updated_at: now,
        };

        let current: CurrentUser = db_user.into();
        assert_eq!(current.role, Role::Supplier);
        assert_eq!(current.supplier_id, Some(supplier_id));
        // Password hash never crosses into the API model
        let json = serde_json::to_value(&current).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
