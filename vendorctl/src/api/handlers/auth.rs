//! Authentication handlers: login, logout, password setup after approval,
//! and password reset.

use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{
            AuthResponse, AuthSuccessResponse, ChangePasswordRequest, ConfirmResetRequest, LoginRequest, LogoutResponse,
            RequestResetRequest, SessionResponse, SetupPasswordRequest, validate_password,
        },
        suppliers::SupplierStatus,
        users::{CurrentUser, Role, UserResponse},
    },
    auth::{password, session},
    db::{
        handlers::{PasswordTokens, Repository, Suppliers, Users},
        models::{password_tokens::TokenPurpose, users::{UserCreateDBRequest, UserUpdateDBRequest}},
    },
    errors::Error,
};

/// Login with email and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<SessionResponse, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // The same 401 for unknown email and wrong password, so login can't be
    // used to probe which addresses have accounts.
    let user = user_repo
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        })?;

    // Verify on a blocking thread; argon2 is deliberately slow
    let candidate = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&candidate, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    let current_user = CurrentUser::from(user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(SessionResponse {
        auth_response: AuthResponse {
            user: UserResponse::from(user),
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; Secure={}; SameSite=Lax; Max-Age=0",
        state.config.auth.session_cookie_name, state.config.auth.cookie_secure
    );

    Ok(LogoutResponse {
        message: "Logout successful".to_string(),
        cookie,
    })
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/authentication/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current session user", body = CurrentUser),
        (status = 401, description = "Not authenticated"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

/// Set the initial password after approval
///
/// Redeems the setup token from the welcome email: creates the supplier's
/// login account and starts a session. Only approved suppliers may complete
/// setup; a rejected or re-review supplier gets 403 and no account.
#[utoipa::path(
    post,
    path = "/authentication/setup-password",
    request_body = SetupPasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Account created and logged in", body = AuthResponse),
        (status = 400, description = "Invalid or expired token"),
        (status = 403, description = "Supplier is not approved"),
        (status = 422, description = "Password too weak"),
        (status = 409, description = "Account already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn setup_password(State(state): State<AppState>, Json(request): Json<SetupPasswordRequest>) -> Result<SessionResponse, Error> {
    validate_password(&request.password)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let token = PasswordTokens::new(&mut tx)
        .find_valid_token(request.token_id, &request.token, TokenPurpose::Setup)
        .await?
        .ok_or_else(|| Error::BadRequest {
            message: "Invalid or expired setup token".to_string(),
        })?;

    let supplier_id = token.supplier_id.ok_or_else(|| Error::Internal {
        operation: "resolve supplier for setup token".to_string(),
    })?;

    let supplier = Suppliers::new(&mut tx)
        .get_by_id(supplier_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Supplier".to_string(),
            id: supplier_id.to_string(),
        })?;

    // The approval can have been withdrawn between the email and the click.
    if supplier.status != SupplierStatus::Approved {
        return Err(Error::Forbidden {
            message: "Supplier application is not approved".to_string(),
        });
    }

    let password_hash = hash_password(&state, request.password.clone()).await?;

    // users_email_unique turns a second setup attempt into a 409 with a
    // reset-password hint rather than a duplicate account.
    let user = Users::new(&mut tx)
        .create(&UserCreateDBRequest {
            username: supplier.contact_name.clone(),
            email: supplier.email.clone(),
            password_hash,
            role: Role::Supplier,
            supplier_id: Some(supplier.id),
        })
        .await?;

    PasswordTokens::new(&mut tx)
        .update(
            token.id,
            &crate::db::models::password_tokens::PasswordTokenUpdateRequest {
                used_at: Some(chrono::Utc::now()),
            },
        )
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!("Created supplier account {} for supplier {}", user.id, supplier.id);

    let current_user = CurrentUser::from(user.clone());
    let session_token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&session_token, &state.config);

    Ok(SessionResponse {
        auth_response: AuthResponse {
            user: UserResponse::from(user),
            message: "Password set successfully".to_string(),
        },
        cookie,
    })
}

/// Request a password-reset email
#[utoipa::path(
    post,
    path = "/authentication/request-password-reset",
    request_body = RequestResetRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Reset email sent if the account exists", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<RequestResetRequest>,
) -> Result<Json<AuthSuccessResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // Always 200: the response must not reveal whether the address has an
    // account, and a delivery failure must look the same as an unknown email.
    let user = Users::new(&mut tx).get_user_by_email(&request.email).await?;

    let issued = match user {
        Some(user) => {
            let (raw_token, token) = PasswordTokens::new(&mut tx).create_for_user(user.id, &state.config).await?;
            Some((user, raw_token, token))
        }
        None => None,
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    if let Some((user, raw_token, token)) = issued
        && let Err(e) = state
            .email
            .send_password_reset_email(&user.email, Some(&user.username), &token.id, &raw_token)
            .await
    {
        tracing::error!("Failed to send password reset email to {}: {e}", user.email);
    }

    Ok(Json(AuthSuccessResponse {
        message: "If an account with that email exists, a password reset link has been sent.".to_string(),
    }))
}

/// Redeem a reset token and set a new password
#[utoipa::path(
    post,
    path = "/authentication/confirm-password-reset",
    request_body = ConfirmResetRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Password reset", body = AuthSuccessResponse),
        (status = 400, description = "Invalid or expired token"),
        (status = 422, description = "Password too weak"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(request): Json<ConfirmResetRequest>,
) -> Result<Json<AuthSuccessResponse>, Error> {
    validate_password(&request.password)?;

    let password_hash = hash_password(&state, request.password.clone()).await?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let token = PasswordTokens::new(&mut tx)
        .find_valid_token(request.token_id, &request.token, TokenPurpose::Reset)
        .await?
        .ok_or_else(|| Error::BadRequest {
            message: "Invalid or expired reset token".to_string(),
        })?;

    let user_id = token.user_id.ok_or_else(|| Error::Internal {
        operation: "resolve user for reset token".to_string(),
    })?;

    Users::new(&mut tx)
        .update(
            user_id,
            &UserUpdateDBRequest {
                username: None,
                password_hash: Some(password_hash),
            },
        )
        .await?;

    // Invalidate every outstanding token, including this one.
    PasswordTokens::new(&mut tx).invalidate_for_user(user_id).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(AuthSuccessResponse {
        message: "Password has been reset successfully".to_string(),
    }))
}

/// Change password while logged in
#[utoipa::path(
    post,
    path = "/authentication/change-password",
    request_body = ChangePasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Password changed", body = AuthSuccessResponse),
        (status = 401, description = "Current password is incorrect"),
        (status = 422, description = "Password too weak"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<AuthSuccessResponse>, Error> {
    validate_password(&request.new_password)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    let user = user_repo.get_by_id(current_user.id).await?.ok_or_else(|| Error::Unauthenticated {
        message: Some("User not found".to_string()),
    })?;

    let current = request.current_password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&current, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Current password is incorrect".to_string()),
        });
    }

    let new_hash = hash_password(&state, request.new_password.clone()).await?;

    user_repo
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                username: None,
                password_hash: Some(new_hash),
            },
        )
        .await?;

    Ok(Json(AuthSuccessResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// Hash a password on a blocking thread with the configured argon2 cost
async fn hash_password(state: &AppState, password: String) -> Result<String, Error> {
    let params = state.config.auth.argon2_params();
    tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

fn create_session_cookie(token: &str, config: &crate::config::Config) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure={}; SameSite=Lax; Max-Age={}",
        config.auth.session_cookie_name,
        token,
        config.auth.cookie_secure,
        config.auth.jwt_expiry.as_secs()
    )
}
