//! API request/response models for authentication flows.

use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::users::UserResponse;
use crate::types::TokenId;

/// Email/password login payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// First-time password setup after approval.
///
/// The setup link in the welcome email carries `token_id` and the raw
/// `token`; the token row stores only an argon2 hash, so both parts are
/// needed to redeem it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetupPasswordRequest {
    #[schema(value_type = String, format = "uuid")]
    pub token_id: TokenId,
    pub token: String,
    pub password: String,
}

/// Request a password-reset email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestResetRequest {
    pub email: String,
}

/// Redeem a reset token and set a new password.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmResetRequest {
    #[schema(value_type = String, format = "uuid")]
    pub token_id: TokenId,
    pub token: String,
    pub password: String,
}

/// Change password while logged in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Successful login or password-setup payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub message: String,
}

/// Message-only acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// [`AuthResponse`] plus the session cookie set on the way out.
pub struct SessionResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for SessionResponse {
    fn into_response(self) -> Response {
        let mut response = axum::Json(self.auth_response).into_response();
        if let Ok(value) = axum::http::HeaderValue::from_str(&self.cookie) {
            response.headers_mut().insert(axum::http::header::SET_COOKIE, value);
        }
        response
    }
}

/// Logout acknowledgement carrying the cookie-clearing header.
pub struct LogoutResponse {
    pub message: String,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        let mut response = axum::Json(AuthSuccessResponse { message: self.message }).into_response();
        if let Ok(value) = axum::http::HeaderValue::from_str(&self.cookie) {
            response.headers_mut().insert(axum::http::header::SET_COOKIE, value);
        }
        response
    }
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a candidate password against the minimum policy.
pub fn validate_password(password: &str) -> Result<(), crate::errors::Error> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(crate::errors::Error::Validation {
            message: format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        });
    }
    Ok(())
}
