//! Subscription plan and settings handlers: the public plans listing shown on
//! the payment page and the admin-side management endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::settings::{
        PlanCreate, PlanResponse, PlanUpdate, PublicPlansResponse, SubscriptionSettingsResponse, SubscriptionSettingsUpdate,
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        handlers::{PlanFilter, Repository, SubscriptionPlans},
        models::subscription_plans::{PlanCreateDBRequest, PlanUpdateDBRequest},
    },
    errors::Error,
    types::PlanId,
};

/// List active subscription plans and the registration fee
///
/// Public: the payment page renders its plan picker from this.
#[utoipa::path(
    get,
    path = "/api/v1/subscription-plans",
    tag = "settings",
    responses(
        (status = 200, description = "Active plans and the registration fee", body = PublicPlansResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_public_plans(State(state): State<AppState>) -> Result<Json<PublicPlansResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = SubscriptionPlans::new(&mut pool_conn);

    let plans = repo.list(&PlanFilter { active_only: true }).await?;
    let settings = repo.get_settings().await?;

    Ok(Json(PublicPlansResponse {
        plans: plans.into_iter().map(PlanResponse::from).collect(),
        registration_fee: settings.registration_fee,
    }))
}

/// List all subscription plans, including inactive ones (admin)
#[utoipa::path(
    get,
    path = "/admin/api/v1/subscription-plans",
    tag = "settings",
    responses(
        (status = 200, description = "All plans", body = Vec<PlanResponse>),
        (status = 403, description = "Not permitted"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_plans(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::SubscriptionSettings, operation::ReadAll>,
) -> Result<Json<Vec<PlanResponse>>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let plans = SubscriptionPlans::new(&mut pool_conn).list(&PlanFilter { active_only: false }).await?;

    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

/// Create a subscription plan (admin)
#[utoipa::path(
    post,
    path = "/admin/api/v1/subscription-plans",
    request_body = PlanCreate,
    tag = "settings",
    responses(
        (status = 201, description = "Plan created", body = PlanResponse),
        (status = 422, description = "Invalid plan"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_plan(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::SubscriptionSettings, operation::CreateAll>,
    Json(plan): Json<PlanCreate>,
) -> Result<(StatusCode, Json<PlanResponse>), Error> {
    plan.validate()?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let created = SubscriptionPlans::new(&mut pool_conn)
        .create(&PlanCreateDBRequest {
            label: plan.label,
            duration_years: plan.duration_years,
            price: plan.price,
            active: plan.active.unwrap_or(true),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PlanResponse::from(created))))
}

/// Update a subscription plan (admin)
#[utoipa::path(
    patch,
    path = "/admin/api/v1/subscription-plans/{plan_id}",
    params(("plan_id" = String, Path, description = "Plan ID")),
    request_body = PlanUpdate,
    tag = "settings",
    responses(
        (status = 200, description = "Updated plan", body = PlanResponse),
        (status = 404, description = "Plan not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_plan(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::SubscriptionSettings, operation::UpdateAll>,
    Path(plan_id): Path<PlanId>,
    Json(update): Json<PlanUpdate>,
) -> Result<Json<PlanResponse>, Error> {
    if let Some(years) = update.duration_years
        && years <= 0
    {
        return Err(Error::Validation {
            message: "Plan duration must be at least one year".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let plan = SubscriptionPlans::new(&mut pool_conn)
        .update(
            plan_id,
            &PlanUpdateDBRequest {
                label: update.label,
                duration_years: update.duration_years,
                price: update.price,
                active: update.active,
            },
        )
        .await?;

    Ok(Json(PlanResponse::from(plan)))
}

/// Delete a subscription plan (admin)
///
/// Retiring a plan that suppliers may still reference is done by deactivating
/// it; deletion is for plans created in error.
#[utoipa::path(
    delete,
    path = "/admin/api/v1/subscription-plans/{plan_id}",
    params(("plan_id" = String, Path, description = "Plan ID")),
    tag = "settings",
    responses(
        (status = 204, description = "Plan deleted"),
        (status = 404, description = "Plan not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_plan(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::SubscriptionSettings, operation::DeleteAll>,
    Path(plan_id): Path<PlanId>,
) -> Result<StatusCode, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let deleted = SubscriptionPlans::new(&mut pool_conn).delete(plan_id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Subscription plan".to_string(),
            id: plan_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Get the subscription settings (admin)
#[utoipa::path(
    get,
    path = "/admin/api/v1/subscription-settings",
    tag = "settings",
    responses(
        (status = 200, description = "Current settings", body = SubscriptionSettingsResponse),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_settings(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::SubscriptionSettings, operation::ReadAll>,
) -> Result<Json<SubscriptionSettingsResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let settings = SubscriptionPlans::new(&mut pool_conn).get_settings().await?;

    Ok(Json(SubscriptionSettingsResponse::from(settings)))
}

/// Update the registration fee (admin)
#[utoipa::path(
    put,
    path = "/admin/api/v1/subscription-settings",
    request_body = SubscriptionSettingsUpdate,
    tag = "settings",
    responses(
        (status = 200, description = "Updated settings", body = SubscriptionSettingsResponse),
        (status = 422, description = "Invalid fee"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_settings(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::SubscriptionSettings, operation::UpdateAll>,
    Json(update): Json<SubscriptionSettingsUpdate>,
) -> Result<Json<SubscriptionSettingsResponse>, Error> {
    if update.registration_fee < rust_decimal::Decimal::ZERO {
        return Err(Error::Validation {
            message: "Registration fee cannot be negative".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let settings = SubscriptionPlans::new(&mut pool_conn)
        .set_registration_fee(update.registration_fee)
        .await?;

    Ok(Json(SubscriptionSettingsResponse::from(settings)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_user};
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_plans_hide_inactive(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        server
            .post("/admin/api/v1/subscription-plans")
            .add_header(name.clone(), value.clone())
            .json(&serde_json::json!({ "label": "1 Year", "duration_years": 1, "price": "499.00" }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/admin/api/v1/subscription-plans")
            .add_header(name.clone(), value.clone())
            .json(&serde_json::json!({ "label": "Legacy", "duration_years": 1, "price": "299.00", "active": false }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get("/api/v1/subscription-plans").await;
        response.assert_status_ok();
        let body: PublicPlansResponse = response.json();
        assert_eq!(body.plans.len(), 1);
        assert_eq!(body.plans[0].label, "1 Year");

        // Admin listing still shows both
        let response = server.get("/admin/api/v1/subscription-plans").add_header(name, value).await;
        let all: Vec<PlanResponse> = response.json();
        assert_eq!(all.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_registration_fee_update(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        let response = server
            .put("/admin/api/v1/subscription-settings")
            .add_header(name.clone(), value.clone())
            .json(&serde_json::json!({ "registration_fee": "150.00" }))
            .await;
        response.assert_status_ok();

        let body: SubscriptionSettingsResponse = response.json();
        assert_eq!(body.registration_fee, Decimal::new(15000, 2));

        let negative = server
            .put("/admin/api/v1/subscription-settings")
            .add_header(name, value)
            .json(&serde_json::json!({ "registration_fee": "-1.00" }))
            .await;
        negative.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_plan_update_validates_duration(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        let response = server
            .post("/admin/api/v1/subscription-plans")
            .add_header(name.clone(), value.clone())
            .json(&serde_json::json!({ "label": "1 Year", "duration_years": 1, "price": "499.00" }))
            .await;
        let plan: PlanResponse = response.json();

        server
            .patch(&format!("/admin/api/v1/subscription-plans/{}", plan.id))
            .add_header(name, value)
            .json(&serde_json::json!({ "duration_years": 0 }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
