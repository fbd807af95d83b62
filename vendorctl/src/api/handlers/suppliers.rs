//! Supplier handlers: public registration, the admin review console, and the
//! supplier's own profile and dashboard.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        pagination::{PaginatedResponse, Pagination},
        payments::PaymentResponse,
        subscriptions::SubscriptionBucket,
        suppliers::{
            PaymentStatus, RegistrationResponse, RejectRequest, ReviewDecisionResponse, SupplierAdminUpdate,
            SupplierListParams, SupplierProfileUpdate, SupplierRegistration, SupplierResponse, SupplierStatus,
        },
    },
    auth::{
        permissions::{RequiresPermission, operation, resource},
        utils::generate_supplier_reference,
    },
    db::{
        handlers::{PasswordTokens, PaymentFilter, Payments, Repository, SupplierFilter, Suppliers},
        models::suppliers::{SupplierCreateDBRequest, SupplierUpdateDBRequest},
    },
    errors::Error,
    types::SupplierId,
};

/// Register a new supplier
///
/// Public endpoint backing the marketing-site registration form. Creates the
/// supplier in `pending_approval` and returns the reference the applicant can
/// quote in support conversations.
#[utoipa::path(
    post,
    path = "/api/v1/suppliers/register",
    request_body = SupplierRegistration,
    tag = "suppliers",
    responses(
        (status = 201, description = "Application received", body = RegistrationResponse),
        (status = 422, description = "Invalid registration payload"),
        (status = 409, description = "A supplier with this email already applied"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(registration): Json<SupplierRegistration>,
) -> Result<(StatusCode, Json<RegistrationResponse>), Error> {
    registration.validate()?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let reference = generate_supplier_reference();
    let request = SupplierCreateDBRequest::from_registration(registration, reference);

    // suppliers_email_unique maps to a 409 for repeat applications
    let supplier = Suppliers::new(&mut pool_conn).create(&request).await?;

    tracing::info!("New supplier application {} ({})", supplier.reference, supplier.id);

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            id: supplier.id,
            reference: supplier.reference,
            status: supplier.status,
        }),
    ))
}

/// List suppliers (admin)
#[utoipa::path(
    get,
    path = "/admin/api/v1/suppliers",
    params(SupplierListParams, Pagination),
    tag = "suppliers",
    responses(
        (status = 200, description = "Suppliers matching the filter", body = PaginatedResponse<SupplierResponse>),
        (status = 403, description = "Not permitted"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Suppliers, operation::ReadAll>,
    Query(params): Query<SupplierListParams>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<SupplierResponse>>, Error> {
    let (skip, limit) = pagination.params();
    let filter = SupplierFilter {
        search: params.search,
        status: params.status,
        skip,
        limit,
    };

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Suppliers::new(&mut pool_conn);

    let total_count = repo.count(&filter).await?;
    let suppliers = repo.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        suppliers.into_iter().map(SupplierResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

/// Get a supplier by ID (admin)
#[utoipa::path(
    get,
    path = "/admin/api/v1/suppliers/{supplier_id}",
    params(("supplier_id" = String, Path, description = "Supplier ID")),
    tag = "suppliers",
    responses(
        (status = 200, description = "Supplier record", body = SupplierResponse),
        (status = 404, description = "Supplier not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_supplier(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Suppliers, operation::ReadAll>,
    Path(supplier_id): Path<SupplierId>,
) -> Result<Json<SupplierResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let supplier = Suppliers::new(&mut pool_conn)
        .get_by_id(supplier_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Supplier".to_string(),
            id: supplier_id.to_string(),
        })?;

    Ok(Json(SupplierResponse::from(supplier)))
}

/// Update a supplier (admin)
#[utoipa::path(
    patch,
    path = "/admin/api/v1/suppliers/{supplier_id}",
    params(("supplier_id" = String, Path, description = "Supplier ID")),
    request_body = SupplierAdminUpdate,
    tag = "suppliers",
    responses(
        (status = 200, description = "Updated supplier", body = SupplierResponse),
        (status = 404, description = "Supplier not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_supplier(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Suppliers, operation::UpdateAll>,
    Path(supplier_id): Path<SupplierId>,
    Json(update): Json<SupplierAdminUpdate>,
) -> Result<Json<SupplierResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let request = SupplierUpdateDBRequest {
        company_name: update.company_name,
        contact_name: update.contact_name,
        phone: update.phone,
        country: update.country,
        city: update.city,
        business_type: update.business_type,
        website: update.website,
        description: update.description,
        categories: update.categories,
        subscription_duration_years: update.subscription_duration_years,
    };

    let supplier = Suppliers::new(&mut pool_conn).update(supplier_id, &request).await?;

    Ok(Json(SupplierResponse::from(supplier)))
}

/// Delete a supplier (admin)
#[utoipa::path(
    delete,
    path = "/admin/api/v1/suppliers/{supplier_id}",
    params(("supplier_id" = String, Path, description = "Supplier ID")),
    tag = "suppliers",
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Suppliers, operation::DeleteAll>,
    Path(supplier_id): Path<SupplierId>,
) -> Result<StatusCode, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let deleted = Suppliers::new(&mut pool_conn).delete(supplier_id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Supplier".to_string(),
            id: supplier_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Approve a supplier application (admin)
///
/// Moves the supplier to `approved`, issues a password-setup token, and sends
/// the welcome email. The email is sent after the status commit; a delivery
/// failure is reported in `email_sent` rather than rolling back the approval.
#[utoipa::path(
    post,
    path = "/admin/api/v1/suppliers/{supplier_id}/approve",
    params(("supplier_id" = String, Path, description = "Supplier ID")),
    tag = "suppliers",
    responses(
        (status = 200, description = "Supplier approved", body = ReviewDecisionResponse),
        (status = 404, description = "Supplier not found"),
        (status = 409, description = "Supplier is not awaiting review"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn approve_supplier(
    State(state): State<AppState>,
    user: RequiresPermission<resource::Suppliers, operation::UpdateAll>,
    Path(supplier_id): Path<SupplierId>,
) -> Result<Json<ReviewDecisionResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let supplier = Suppliers::new(&mut tx)
        .get_by_id(supplier_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Supplier".to_string(),
            id: supplier_id.to_string(),
        })?;

    if !matches!(supplier.status, SupplierStatus::PendingApproval | SupplierStatus::PendingReview) {
        return Err(Error::Conflict {
            message: format!("Supplier is not awaiting review (status: {:?})", supplier.status),
        });
    }

    let supplier = Suppliers::new(&mut tx).set_status(supplier_id, SupplierStatus::Approved, None).await?;
    let (raw_token, token) = PasswordTokens::new(&mut tx).create_for_supplier(supplier_id, &state.config).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!("Supplier {} approved by {}", supplier.reference, user.email);

    let email_sent = match state
        .email
        .send_welcome_email(&supplier.email, &supplier.contact_name, &supplier.reference, &token.id, &raw_token)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to send welcome email to {}: {e}", supplier.email);
            false
        }
    };

    Ok(Json(ReviewDecisionResponse {
        supplier: SupplierResponse::from(supplier),
        email_sent,
    }))
}

/// Reject a supplier application (admin)
#[utoipa::path(
    post,
    path = "/admin/api/v1/suppliers/{supplier_id}/reject",
    params(("supplier_id" = String, Path, description = "Supplier ID")),
    request_body = RejectRequest,
    tag = "suppliers",
    responses(
        (status = 200, description = "Supplier rejected", body = ReviewDecisionResponse),
        (status = 404, description = "Supplier not found"),
        (status = 409, description = "Supplier is not awaiting review"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn reject_supplier(
    State(state): State<AppState>,
    user: RequiresPermission<resource::Suppliers, operation::UpdateAll>,
    Path(supplier_id): Path<SupplierId>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ReviewDecisionResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Suppliers::new(&mut pool_conn);

    let supplier = repo.get_by_id(supplier_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Supplier".to_string(),
        id: supplier_id.to_string(),
    })?;

    if !matches!(supplier.status, SupplierStatus::PendingApproval | SupplierStatus::PendingReview) {
        return Err(Error::Conflict {
            message: format!("Supplier is not awaiting review (status: {:?})", supplier.status),
        });
    }

    let supplier = repo
        .set_status(supplier_id, SupplierStatus::Rejected, request.reason.as_deref())
        .await?;

    tracing::info!("Supplier {} rejected by {}", supplier.reference, user.email);

    let email_sent = match state
        .email
        .send_rejection_email(
            &supplier.email,
            &supplier.contact_name,
            &supplier.reference,
            supplier.rejection_reason.as_deref(),
        )
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to send rejection email to {}: {e}", supplier.email);
            false
        }
    };

    Ok(Json(ReviewDecisionResponse {
        supplier: SupplierResponse::from(supplier),
        email_sent,
    }))
}

/// Get the caller's own supplier profile
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/me",
    tag = "suppliers",
    responses(
        (status = 200, description = "The caller's supplier record", body = SupplierResponse),
        (status = 404, description = "No supplier record linked to this account"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_own_profile(
    State(state): State<AppState>,
    user: RequiresPermission<resource::Suppliers, operation::ReadOwn>,
) -> Result<Json<SupplierResponse>, Error> {
    let supplier = load_own_supplier(&state, &user).await?;
    Ok(Json(SupplierResponse::from(supplier)))
}

/// Update the caller's own supplier profile
///
/// Any successful edit drops the record back to `pending_review` so an admin
/// looks at it again.
#[utoipa::path(
    patch,
    path = "/api/v1/suppliers/me",
    request_body = SupplierProfileUpdate,
    tag = "suppliers",
    responses(
        (status = 200, description = "Updated profile, now pending review", body = SupplierResponse),
        (status = 404, description = "No supplier record linked to this account"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_own_profile(
    State(state): State<AppState>,
    user: RequiresPermission<resource::Suppliers, operation::UpdateOwn>,
    Json(update): Json<SupplierProfileUpdate>,
) -> Result<Json<SupplierResponse>, Error> {
    let supplier_id = user.supplier_id.ok_or_else(|| Error::NotFound {
        resource: "Supplier".to_string(),
        id: user.id.to_string(),
    })?;

    let request = SupplierUpdateDBRequest {
        company_name: update.company_name,
        contact_name: update.contact_name,
        phone: update.phone,
        country: update.country,
        city: update.city,
        business_type: update.business_type,
        website: update.website,
        description: update.description,
        categories: update.categories,
        subscription_duration_years: None,
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut repo = Suppliers::new(&mut tx);
    repo.update(supplier_id, &request).await?;
    let supplier = repo.set_status(supplier_id, SupplierStatus::PendingReview, None).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(SupplierResponse::from(supplier)))
}

/// The supplier's own dashboard: profile, subscription state, and payment
/// history. Behind the payment gate, so the frontend can rely on the
/// subscription fields being populated.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct SupplierDashboard {
    pub supplier: SupplierResponse,
    pub subscription: SubscriptionBucket,
    pub payments: Vec<PaymentResponse>,
}

/// Get the caller's dashboard
///
/// Returns 402 until the supplier has completed payment; the frontend routes
/// that to the checkout flow.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "suppliers",
    responses(
        (status = 200, description = "Dashboard data", body = SupplierDashboard),
        (status = 402, description = "Subscription payment not completed"),
        (status = 404, description = "No supplier record linked to this account"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_own_dashboard(
    State(state): State<AppState>,
    user: RequiresPermission<resource::Suppliers, operation::ReadOwn>,
) -> Result<Json<SupplierDashboard>, Error> {
    let supplier = load_own_supplier(&state, &user).await?;

    if supplier.payment_status != PaymentStatus::Completed {
        return Err(Error::PaymentRequired {
            message: "Complete your subscription payment to access the dashboard".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let payments = Payments::new(&mut pool_conn)
        .list(&PaymentFilter {
            supplier_id: Some(supplier.id),
            skip: 0,
            limit: 100,
        })
        .await?;

    let subscription = SubscriptionBucket::for_supplier(&supplier, Utc::now());

    Ok(Json(SupplierDashboard {
        supplier: SupplierResponse::from(supplier),
        subscription,
        payments: payments.into_iter().map(PaymentResponse::from).collect(),
    }))
}

async fn load_own_supplier(
    state: &AppState,
    user: &crate::api::models::users::CurrentUser,
) -> Result<crate::db::models::suppliers::SupplierDBResponse, Error> {
    let supplier_id = user.supplier_id.ok_or_else(|| Error::NotFound {
        resource: "Supplier".to_string(),
        id: user.id.to_string(),
    })?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Suppliers::new(&mut pool_conn)
        .get_by_id(supplier_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Supplier".to_string(),
            id: supplier_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_supplier, create_test_user};
    use sqlx::PgPool;

    fn registration_payload() -> serde_json::Value {
        serde_json::json!({
            "company_name": "Acme Trading LLC",
            "contact_name": "Jo Park",
            "email": "jo@acme.example",
            "phone": "+971500000000",
            "country": "United Arab Emirates",
            "city": "Dubai",
            "business_type": "Distributor",
            "categories": ["Electronics"],
            "terms_accepted": true,
            "privacy_accepted": true,
        })
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_creates_pending_supplier(pool: PgPool) {
        let (server, _state) = create_test_app(pool.clone()).await;

        let response = server.post("/api/v1/suppliers/register").json(&registration_payload()).await;
        response.assert_status(StatusCode::CREATED);

        let body: RegistrationResponse = response.json();
        assert_eq!(body.status, SupplierStatus::PendingApproval);
        assert!(body.reference.starts_with("SUP-"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email_conflicts(pool: PgPool) {
        let (server, _state) = create_test_app(pool.clone()).await;

        server.post("/api/v1/suppliers/register").json(&registration_payload()).await.assert_status(StatusCode::CREATED);

        let response = server.post("/api/v1/suppliers/register").json(&registration_payload()).await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_rejects_invalid_payload(pool: PgPool) {
        let (server, _state) = create_test_app(pool.clone()).await;

        let mut payload = registration_payload();
        payload["terms_accepted"] = serde_json::json!(false);

        let response = server.post("/api/v1/suppliers/register").json(&payload).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_list_requires_admin(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;

        // Anonymous
        server.get("/admin/api/v1/suppliers").await.assert_status(StatusCode::UNAUTHORIZED);

        // Supplier role
        let supplier_user = create_test_user(&pool, "supplier-role@example.com", "some password", Role::Supplier).await;
        let (name, value) = add_auth_headers(&supplier_user, &state.config);
        server
            .get("/admin/api/v1/suppliers")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_list_filters_by_status(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);
        

        let a = create_test_supplier(&pool, "a@example.com").await;
        create_test_supplier(&pool, "b@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        Suppliers::new(&mut conn).set_status(a.id, SupplierStatus::Approved, None).await.unwrap();
        drop(conn);

        let response = server
            .get("/admin/api/v1/suppliers")
            .add_query_param("status", "approved")
            .add_header(name, value)
            .await;
        response.assert_status_ok();

        let body: PaginatedResponse<SupplierResponse> = response.json();
        assert_eq!(body.total_count, 1);
        assert_eq!(body.data[0].id, a.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_approve_then_approve_again_conflicts(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        let supplier = create_test_supplier(&pool, "approve@example.com").await;

        let response = server
            .post(&format!("/admin/api/v1/suppliers/{}/approve", supplier.id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status_ok();

        let body: ReviewDecisionResponse = response.json();
        assert_eq!(body.supplier.status, SupplierStatus::Approved);

        let retry = server
            .post(&format!("/admin/api/v1/suppliers/{}/approve", supplier.id))
            .add_header(name, value)
            .await;
        retry.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_reject_records_reason(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        let supplier = create_test_supplier(&pool, "reject@example.com").await;

        let response = server
            .post(&format!("/admin/api/v1/suppliers/{}/reject", supplier.id))
            .add_header(name, value)
            .json(&serde_json::json!({ "reason": "Incomplete documentation" }))
            .await;
        response.assert_status_ok();

        let body: ReviewDecisionResponse = response.json();
        assert_eq!(body.supplier.status, SupplierStatus::Rejected);
        assert_eq!(body.supplier.rejection_reason.as_deref(), Some("Incomplete documentation"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_profile_edit_drops_back_to_pending_review(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;

        let supplier = create_test_supplier(&pool, "edit@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        Suppliers::new(&mut conn).set_status(supplier.id, SupplierStatus::Approved, None).await.unwrap();
        drop(conn);

        let user = crate::test_utils::create_test_supplier_user(&pool, &supplier, "a fine password").await;
        let (name, value) = add_auth_headers(&user, &state.config);

        let response = server
            .patch("/api/v1/suppliers/me")
            .add_header(name, value)
            .json(&serde_json::json!({ "description": "We now also stock cables" }))
            .await;
        response.assert_status_ok();

        let body: SupplierResponse = response.json();
        assert_eq!(body.status, SupplierStatus::PendingReview);
        assert_eq!(body.description.as_deref(), Some("We now also stock cables"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_dashboard_gated_until_paid(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;

        let supplier = create_test_supplier(&pool, "gated@example.com").await;
        let user = crate::test_utils::create_test_supplier_user(&pool, &supplier, "a fine password").await;
        let (name, value) = add_auth_headers(&user, &state.config);

        let response = server
            .get("/api/v1/dashboard")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        // Mark the subscription paid and try again
        let mut conn = pool.acquire().await.unwrap();
        let now = Utc::now();
        Suppliers::new(&mut conn)
            .complete_payment(
                supplier.id,
                &crate::db::models::suppliers::SupplierPaymentCompletion {
                    amount: rust_decimal::Decimal::new(149900, 2),
                    payment_date: now,
                    duration_years: 1,
                    expires_at: crate::api::models::subscriptions::subscription_expiry(now, 1),
                },
            )
            .await
            .unwrap();
        drop(conn);

        let response = server
            .get("/api/v1/dashboard")
            .add_header(name, value)
            .await;
        response.assert_status_ok();

        let body: SupplierDashboard = response.json();
        assert_eq!(body.subscription, SubscriptionBucket::Active);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_dashboard_gate_keys_on_payment_status(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;

        let supplier = create_test_supplier(&pool, "desync@example.com").await;
        let user = crate::test_utils::create_test_supplier_user(&pool, &supplier, "a fine password").await;
        let (name, value) = add_auth_headers(&user, &state.config);

        // An expiry date alone, e.g. from hand-edited payment fields, does
        // not open the gate while the payment itself is still pending.
        sqlx::query!(
            "UPDATE suppliers SET subscription_expires_at = NOW() + INTERVAL '1 year' WHERE id = $1",
            supplier.id
        )
        .execute(&pool)
        .await
        .unwrap();

        server
            .get("/api/v1/dashboard")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::PAYMENT_REQUIRED);
    }
}
