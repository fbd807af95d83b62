//! Payment handlers: supplier checkout, the gateway webhook, and the admin
//! payments dashboard with CSV export.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        payments::{CheckoutRequest, CheckoutResponse, DashboardParams, DashboardResponse, DashboardRow, DashboardSummary},
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::handlers::{DashboardFilter, Repository, SubscriptionPlans, Suppliers},
    errors::Error,
};

/// Create a checkout session for the caller's subscription payment
///
/// Total charged is the one-time registration fee plus the selected plan's
/// price. Conflicts if the supplier has already paid.
#[utoipa::path(
    post,
    path = "/api/v1/payments/checkout-session",
    request_body = CheckoutRequest,
    tag = "payments",
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 400, description = "Unknown or inactive plan"),
        (status = 409, description = "Payment already completed"),
        (status = 502, description = "Payment gateway unavailable"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    user: RequiresPermission<resource::Payments, operation::ReadOwn>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, Error> {
    let supplier_id = user.supplier_id.ok_or_else(|| Error::Forbidden {
        message: "Only supplier accounts can purchase a subscription".to_string(),
    })?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let supplier = Suppliers::new(&mut pool_conn)
        .get_by_id(supplier_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Supplier".to_string(),
            id: supplier_id.to_string(),
        })?;

    if supplier.subscription_expires_at.is_some() {
        return Err(Error::Conflict {
            message: "Subscription payment has already been completed".to_string(),
        });
    }

    let mut plan_repo = SubscriptionPlans::new(&mut pool_conn);
    let plan = plan_repo.get_by_id(request.plan_id).await?.ok_or_else(|| Error::BadRequest {
        message: "Unknown subscription plan".to_string(),
    })?;
    if !plan.active {
        return Err(Error::BadRequest {
            message: "This subscription plan is no longer offered".to_string(),
        });
    }

    let settings = plan_repo.get_settings().await?;
    let total = settings.registration_fee + plan.price;
    drop(pool_conn);

    let session = state
        .payment_provider
        .create_checkout_session(&state.db, &supplier, &plan, total, &request.cancel_url, &request.success_url)
        .await?;

    tracing::info!(
        "Checkout session {} created for supplier {} (plan {}, total {})",
        session.session_id,
        supplier.reference,
        plan.label,
        total
    );

    Ok(Json(CheckoutResponse {
        session_id: session.session_id,
        checkout_url: session.url,
    }))
}

/// Payment gateway webhook
///
/// Confirmation happens here, server-side, never from the browser redirect.
/// Signature failures are 400; once the event verifies, the response is
/// always 200 so the gateway stops retrying, even if the event is one we
/// ignore or have already processed.
#[utoipa::path(
    post,
    path = "/webhooks/payments",
    tag = "payments",
    responses(
        (status = 200, description = "Event accepted"),
        (status = 400, description = "Invalid signature or payload"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn payment_webhook(State(state): State<AppState>, headers: HeaderMap, body: String) -> Result<StatusCode, Error> {
    let event = match state.payment_provider.validate_webhook(&headers, &body).await {
        Ok(Some(event)) => event,
        Ok(None) => return Ok(StatusCode::OK),
        Err(e) => {
            tracing::warn!("Rejected payment webhook: {e}");
            return Err(Error::BadRequest {
                message: "Invalid webhook signature or payload".to_string(),
            });
        }
    };

    match state.payment_provider.process_webhook_event(&state.db, &event).await {
        Ok(Some(outcome)) => {
            tracing::info!(
                "Recorded payment for supplier {} via webhook ({})",
                outcome.supplier.reference,
                event.event_type
            );

            // Email failure must not fail the webhook; the gateway would
            // retry an already-recorded payment.
            if let Err(e) = state
                .email
                .send_payment_confirmation_email(
                    &outcome.supplier.email,
                    &outcome.supplier.contact_name,
                    outcome.amount,
                    outcome.duration_years,
                    outcome.expires_at,
                )
                .await
            {
                tracing::error!("Failed to send payment confirmation to {}: {e}", outcome.supplier.email);
            }
        }
        Ok(None) => {
            tracing::debug!("Webhook event {} needed no action", event.event_type);
        }
        Err(e) => {
            // Deliberate 200: the event was authentic, and a retry would hit
            // the same error. Log loudly instead.
            tracing::error!("Failed to process webhook event {}: {e}", event.event_type);
        }
    }

    Ok(StatusCode::OK)
}

/// Admin payments dashboard
///
/// SQL handles search/status/business-type/date filters; the subscription
/// bucket filter and pagination run over the fetched rows because the bucket
/// is derived from the current time. The summary tallies all matching rows,
/// not just the returned page.
#[utoipa::path(
    get,
    path = "/admin/api/v1/payments/dashboard",
    params(DashboardParams, Pagination),
    tag = "payments",
    responses(
        (status = 200, description = "Dashboard rows and summary", body = DashboardResponse),
        (status = 403, description = "Not permitted"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn payments_dashboard(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Payments, operation::ReadAll>,
    Query(params): Query<DashboardParams>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<DashboardResponse>, Error> {
    let (skip, limit) = pagination.params();
    let rows = fetch_dashboard_rows(&state, &params).await?;

    let summary = DashboardSummary::tally(rows.iter().map(|r| r.subscription));
    let total_count = rows.len() as i64;
    let page = rows.into_iter().skip(skip as usize).take(limit as usize).collect();

    Ok(Json(DashboardResponse {
        data: page,
        total_count,
        skip,
        limit,
        summary,
    }))
}

/// Export the payments dashboard as CSV
///
/// Same filters and ordering as the dashboard, without pagination.
#[utoipa::path(
    get,
    path = "/admin/api/v1/payments/export.csv",
    params(DashboardParams),
    tag = "payments",
    responses(
        (status = 200, description = "CSV export of matching suppliers", content_type = "text/csv"),
        (status = 403, description = "Not permitted"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn export_payments_csv(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Payments, operation::ReadAll>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, Error> {
    let rows = fetch_dashboard_rows(&state, &params).await?;
    let csv = render_csv(&rows);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"payments.csv\""),
        ],
        csv,
    )
        .into_response())
}

async fn fetch_dashboard_rows(state: &AppState, params: &DashboardParams) -> Result<Vec<DashboardRow>, Error> {
    let filter = DashboardFilter {
        search: params.search.clone(),
        status: params.status,
        business_type: params.business_type.clone(),
        payment_from: params.payment_from,
        payment_to: params.payment_to,
    };

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let suppliers = Suppliers::new(&mut pool_conn).list_for_dashboard(&filter).await?;

    let now = Utc::now();
    let rows = suppliers
        .into_iter()
        .map(|s| DashboardRow::from_supplier(s, now))
        .filter(|r| params.subscription.is_none_or(|bucket| r.subscription == bucket))
        .collect();

    Ok(rows)
}

const CSV_HEADER: &str = "reference,company_name,contact_name,email,business_type,status,payment_status,payment_amount,payment_date,subscription_expires_at,subscription\n";

fn render_csv(rows: &[DashboardRow]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + rows.len() * 128);
    out.push_str(CSV_HEADER);

    for row in rows {
        let fields = [
            row.reference.clone(),
            row.company_name.clone(),
            row.contact_name.clone(),
            row.email.clone(),
            row.business_type.clone(),
            format_enum(&row.status),
            format_enum(&row.payment_status),
            row.payment_amount.map(|a| a.to_string()).unwrap_or_default(),
            row.payment_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
            row.subscription_expires_at.map(|d| d.to_rfc3339()).unwrap_or_default(),
            format_enum(&row.subscription),
        ];

        let line: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

/// serde knows the wire names; reuse them instead of a second Display impl
fn format_enum<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// RFC 4180 quoting: wrap fields containing commas, quotes, or newlines and
/// double any embedded quotes.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
