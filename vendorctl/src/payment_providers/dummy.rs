//! Dummy payment provider implementation
//!
//! Completes checkout instantly without an external gateway. Useful for
//! development and for exercising the payment flow in tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    db::models::{subscription_plans::PlanDBResponse, suppliers::SupplierDBResponse},
    payment_providers::{
        CheckoutSessionDetails, PaymentError, PaymentOutcome, PaymentProvider, PaymentSession, Result, WebhookEvent,
        record_confirmed_payment,
    },
};

/// Dummy payment provider that treats every session as instantly paid
#[derive(Debug, Default)]
pub struct DummyProvider;

impl DummyProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentProvider for DummyProvider {
    async fn create_checkout_session(
        &self,
        _db_pool: &PgPool,
        supplier: &SupplierDBResponse,
        plan: &PlanDBResponse,
        total: Decimal,
        _cancel_url: &str,
        success_url: &str,
    ) -> Result<CheckoutSessionDetails> {
        // Everything needed to confirm the payment later is packed into the
        // session id: supplier, duration, and amount in minor units.
        let amount_cents = (total * Decimal::ONE_HUNDRED).round_dp(0);
        let session_id = format!(
            "dummy_{}_{}_{}_{}",
            supplier.id,
            plan.duration_years,
            amount_cents,
            uuid::Uuid::new_v4()
        );

        // There is no hosted checkout page: the "gateway" redirects straight
        // to the success URL.
        let url = success_url.replace("{CHECKOUT_SESSION_ID}", &session_id);

        tracing::info!("Dummy provider created checkout session {} for supplier {}", session_id, supplier.id);

        Ok(CheckoutSessionDetails { session_id, url })
    }

    async fn get_payment_session(&self, session_id: &str) -> Result<PaymentSession> {
        // Format: dummy_{supplier_id}_{duration_years}_{amount_cents}_{uuid}
        let invalid = || PaymentError::InvalidData("Invalid dummy session ID format".to_string());

        let rest = session_id.strip_prefix("dummy_").ok_or_else(invalid)?;
        let parts: Vec<&str> = rest.splitn(4, '_').collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let supplier_id = parts[0].to_string();
        let duration_years: i32 = parts[1].parse().map_err(|_| invalid())?;
        let amount_cents: i64 = parts[2].parse().map_err(|_| invalid())?;

        Ok(PaymentSession {
            supplier_id,
            amount: Decimal::new(amount_cents, 2),
            duration_years,
            // Dummy sessions are always "paid".
            is_paid: true,
        })
    }

    async fn process_payment_session(&self, db_pool: &PgPool, session_id: &str) -> Result<Option<PaymentOutcome>> {
        let session = self.get_payment_session(session_id).await?;
        record_confirmed_payment(db_pool, session_id, &session).await
    }

    async fn validate_webhook(&self, _headers: &axum::http::HeaderMap, _body: &str) -> Result<Option<WebhookEvent>> {
        // No webhooks without a gateway.
        Ok(None)
    }

    async fn process_webhook_event(&self, _db_pool: &PgPool, _event: &WebhookEvent) -> Result<Option<PaymentOutcome>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::models::suppliers::PaymentStatus,
        db::handlers::{Payments, Repository, Suppliers},
        db::models::subscription_plans::PlanCreateDBRequest,
    };
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    async fn create_test_plan(pool: &PgPool, duration_years: i32, price: Decimal) -> PlanDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        crate::db::handlers::SubscriptionPlans::new(&mut conn)
            .create(&PlanCreateDBRequest {
                label: format!("{duration_years} year(s)"),
                duration_years,
                price,
                active: true,
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_full_payment_flow(pool: PgPool) {
        let provider = DummyProvider::new();
        let supplier = crate::test_utils::create_test_supplier(&pool, "dummy-flow@example.com").await;
        let plan = create_test_plan(&pool, 1, Decimal::new(1000, 0)).await;

        let cancel_url = "http://localhost:3001/payment?status=cancelled&session_id={CHECKOUT_SESSION_ID}";
        let success_url = "http://localhost:3001/payment?status=success&session_id={CHECKOUT_SESSION_ID}";

        let checkout = provider
            .create_checkout_session(&pool, &supplier, &plan, plan.price, cancel_url, success_url)
            .await
            .unwrap();

        assert!(checkout.url.contains("status=success"));
        assert!(checkout.url.contains(&format!("session_id=dummy_{}", supplier.id)));

        // Nothing is recorded until the session is processed, matching the
        // webhook-driven gateway flow.
        let mut conn = pool.acquire().await.unwrap();
        assert!(Payments::new(&mut conn).get_by_source_id(&checkout.session_id).await.unwrap().is_none());
        drop(conn);

        let outcome = provider
            .process_payment_session(&pool, &checkout.session_id)
            .await
            .unwrap()
            .expect("first processing should record the payment");

        assert_eq!(outcome.amount, Decimal::new(1000, 0));
        assert_eq!(outcome.duration_years, 1);
        assert_eq!(outcome.supplier.payment_status, PaymentStatus::Completed);
        assert_eq!(outcome.supplier.subscription_expires_at, Some(outcome.expires_at));

        let mut conn = pool.acquire().await.unwrap();
        let payment = Payments::new(&mut conn)
            .get_by_source_id(&checkout.session_id)
            .await
            .unwrap()
            .expect("payment row should exist");
        assert_eq!(payment.supplier_id, supplier.id);
        assert_eq!(payment.amount, Decimal::new(1000, 0));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_processing_is_idempotent(pool: PgPool) {
        let provider = DummyProvider::new();
        let supplier = crate::test_utils::create_test_supplier(&pool, "dummy-idem@example.com").await;
        let plan = create_test_plan(&pool, 3, Decimal::new(2500, 0)).await;

        let success_url = "http://localhost:3001/payment?status=success&session_id={CHECKOUT_SESSION_ID}";
        let checkout = provider
            .create_checkout_session(&pool, &supplier, &plan, plan.price, "http://localhost:3001/payment", success_url)
            .await
            .unwrap();

        // Simulate retries and duplicate webhook deliveries.
        let first = provider.process_payment_session(&pool, &checkout.session_id).await.unwrap();
        let second = provider.process_payment_session(&pool, &checkout.session_id).await.unwrap();
        let third = provider.process_payment_session(&pool, &checkout.session_id).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert!(third.is_none());

        let mut conn = pool.acquire().await.unwrap();
        let supplier = Suppliers::new(&mut conn).get_by_id(supplier.id).await.unwrap().unwrap();
        assert_eq!(supplier.subscription_duration_years, Some(3));
    }

    #[tokio::test]
    async fn test_rejects_malformed_session_ids() {
        let provider = DummyProvider::new();

        for session_id in ["cs_test_123", "dummy_", "dummy_not-a-uuid"] {
            let err = provider.get_payment_session(session_id).await.unwrap_err();
            assert!(matches!(err, PaymentError::InvalidData(_)), "{session_id} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_webhooks_not_supported() {
        let provider = DummyProvider::new();
        let headers = axum::http::HeaderMap::new();

        let result = provider.validate_webhook(&headers, "{}").await.unwrap();
        assert!(result.is_none());
    }
}
