//! Payment gateway abstraction.
//!
//! Checkout sessions are created against a gateway and confirmed server-side:
//! the gateway calls back over a signed webhook, and the confirmation is
//! recorded here. Recording is idempotent through the
//! `payments_source_id_unique` constraint, so duplicate webhook deliveries and
//! replica races settle on a single payment row.

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    api::models::subscriptions::subscription_expiry,
    config::PaymentConfig,
    db::{
        errors::DbError,
        handlers::{Payments, Repository, Suppliers},
        models::{
            payments::PaymentCreateDBRequest,
            subscription_plans::PlanDBResponse,
            suppliers::{SupplierDBResponse, SupplierPaymentCompletion},
        },
    },
    types::SupplierId,
};

pub mod dummy;
pub mod stripe;

/// Create a payment provider from configuration.
///
/// This is the single point where config turns into a provider instance.
pub fn create_provider(config: PaymentConfig) -> Box<dyn PaymentProvider> {
    match config {
        PaymentConfig::Stripe(stripe_config) => Box::new(stripe::StripeProvider::from(stripe_config)),
        PaymentConfig::Dummy => Box::new(dummy::DummyProvider::new()),
    }
}

/// Result type for payment provider operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors that can occur during payment processing
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider API error: {0}")]
    ProviderApi(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Payment not completed yet")]
    PaymentNotCompleted,

    #[error("Invalid payment data: {0}")]
    InvalidData(String),
}

impl From<PaymentError> for StatusCode {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::PaymentNotCompleted => StatusCode::PAYMENT_REQUIRED,
            PaymentError::InvalidData(_) => StatusCode::BAD_REQUEST,
            PaymentError::ProviderApi(_) | PaymentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for PaymentError {
    fn from(err: DbError) -> Self {
        PaymentError::InvalidData(format!("Database error: {err}"))
    }
}

/// A checkout session handed back by the gateway at creation time
#[derive(Debug, Clone)]
pub struct CheckoutSessionDetails {
    pub session_id: String,
    /// Hosted checkout page the supplier is redirected to
    pub url: String,
}

/// A checkout session as reported by the gateway
#[derive(Debug, Clone)]
pub struct PaymentSession {
    /// Supplier the session was created for, as carried in the gateway's
    /// client reference field
    pub supplier_id: String,
    /// Amount paid, in major currency units
    pub amount: Decimal,
    /// Subscription length purchased, carried in session metadata
    pub duration_years: i32,
    pub is_paid: bool,
}

/// A webhook event from a payment provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    /// Gateway event type (e.g. "checkout.session.completed")
    pub event_type: String,
    pub session_id: Option<String>,
}

/// A newly recorded payment, returned so callers can send the confirmation
/// email outside the database transaction
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub supplier: SupplierDBResponse,
    pub amount: Decimal,
    pub duration_years: i32,
    pub expires_at: DateTime<Utc>,
}

/// Abstract payment gateway interface
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session for a supplier purchasing the given plan.
    ///
    /// `total` is the full amount to charge (registration fee plus plan
    /// price). `success_url` and `cancel_url` are where the gateway redirects
    /// the supplier afterwards; `{CHECKOUT_SESSION_ID}` placeholders are
    /// filled in by the gateway.
    async fn create_checkout_session(
        &self,
        db_pool: &PgPool,
        supplier: &SupplierDBResponse,
        plan: &PlanDBResponse,
        total: Decimal,
        cancel_url: &str,
        success_url: &str,
    ) -> Result<CheckoutSessionDetails>;

    /// Retrieve a checkout session from the gateway
    async fn get_payment_session(&self, session_id: &str) -> Result<PaymentSession>;

    /// Confirm a completed checkout session: record the payment and open the
    /// supplier's subscription window.
    ///
    /// Idempotent. Returns `Ok(None)` when the session was already recorded,
    /// `Ok(Some(..))` when this call recorded it.
    async fn process_payment_session(&self, db_pool: &PgPool, session_id: &str) -> Result<Option<PaymentOutcome>>;

    /// Validate and extract a webhook event from raw request data.
    ///
    /// Returns `None` if this provider doesn't support webhooks, `Err` if the
    /// signature or payload is invalid.
    async fn validate_webhook(&self, headers: &axum::http::HeaderMap, body: &str) -> Result<Option<WebhookEvent>>;

    /// Process a validated webhook event. Idempotent.
    async fn process_webhook_event(&self, db_pool: &PgPool, event: &WebhookEvent) -> Result<Option<PaymentOutcome>>;
}

/// Record a paid checkout session against its supplier.
///
/// Shared by all providers. The payment row insert and the supplier's
/// subscription update commit atomically; a concurrent insert of the same
/// session id loses on the unique constraint and is treated as already
/// processed.
pub(crate) async fn record_confirmed_payment(db_pool: &PgPool, session_id: &str, session: &PaymentSession) -> Result<Option<PaymentOutcome>> {
    // Fast path: skip the gateway-confirmed insert when a duplicate delivery
    // has already been recorded.
    {
        let mut conn = db_pool.acquire().await?;
        if Payments::new(&mut conn).get_by_source_id(session_id).await?.is_some() {
            tracing::trace!("Payment for session {} already recorded, skipping (fast path)", session_id);
            return Ok(None);
        }
    }

    if !session.is_paid {
        tracing::trace!("Session {} has not been paid, skipping", session_id);
        return Err(PaymentError::PaymentNotCompleted);
    }

    let supplier_id: SupplierId = session
        .supplier_id
        .parse()
        .map_err(|e| PaymentError::InvalidData(format!("Invalid supplier ID in session: {e}")))?;

    let payment_date = Utc::now();
    let expires_at = subscription_expiry(payment_date, session.duration_years);

    let mut tx = db_pool.begin().await?;

    let created = Payments::new(&mut tx)
        .create(&PaymentCreateDBRequest {
            supplier_id,
            source_id: session_id.to_string(),
            amount: session.amount,
            duration_years: session.duration_years,
        })
        .await;

    match created {
        Ok(_) => {}
        Err(DbError::UniqueViolation { constraint, .. }) if constraint.as_deref() == Some("payments_source_id_unique") => {
            // Another replica got there first.
            tracing::trace!("Payment for session {} recorded concurrently, treating as processed", session_id);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    }

    let supplier = Suppliers::new(&mut tx)
        .complete_payment(
            supplier_id,
            &SupplierPaymentCompletion {
                amount: session.amount,
                payment_date,
                duration_years: session.duration_years,
                expires_at,
            },
        )
        .await?;

    tx.commit().await?;

    tracing::info!(
        "Recorded payment for session {} (supplier {}, {} year(s), expires {})",
        session_id,
        supplier_id,
        session.duration_years,
        expires_at
    );

    Ok(Some(PaymentOutcome {
        supplier,
        amount: session.amount,
        duration_years: session.duration_years,
        expires_at,
    }))
}
