//! Database models for user accounts.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::models::users::Role;
use crate::types::{SupplierId, UserId};

/// Database request for creating a new user account
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub supplier_id: Option<SupplierId>,
}

/// Database request for updating a user account
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

/// Database response for a user account (matches the `users` table row)
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub supplier_id: Option<SupplierId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
