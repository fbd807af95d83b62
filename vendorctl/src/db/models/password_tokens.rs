//! Database models for password setup/reset tokens.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{SupplierId, TokenId, UserId};

/// What a token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "token_purpose", rename_all = "lowercase")]
pub enum TokenPurpose {
    /// First-time credential creation for an approved supplier
    Setup,
    /// Password reset for an existing account
    Reset,
}

/// Database entity model
#[derive(Debug, Clone, FromRow)]
pub struct PasswordToken {
    pub id: TokenId,
    pub supplier_id: Option<SupplierId>,
    pub user_id: Option<UserId>,
    pub token_hash: String,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

/// Request for creating a password token
#[derive(Debug, Clone)]
pub struct PasswordTokenCreateRequest {
    pub supplier_id: Option<SupplierId>,
    pub user_id: Option<UserId>,
    pub raw_token: String,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
    pub argon2_params: crate::auth::password::Argon2Params,
}

/// Request for updating a password token (mark as used)
#[derive(Debug, Clone)]
pub struct PasswordTokenUpdateRequest {
    pub used_at: Option<DateTime<Utc>>,
}

/// Response type (same as entity for now)
pub type PasswordTokenResponse = PasswordToken;

/// Filter for password tokens
#[derive(Debug, Clone)]
pub struct PasswordTokenFilter {
    pub user_id: Option<UserId>,
    pub skip: i64,
    pub limit: i64,
}
