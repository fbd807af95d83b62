//! Stripe payment provider implementation

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sqlx::PgPool;
use stripe::{
    CheckoutSession, CheckoutSessionCustomerCreation, CheckoutSessionMode, CheckoutSessionPaymentStatus, CheckoutSessionUiMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, Currency,
};

use crate::{
    config::StripeConfig,
    db::{
        handlers::{Payments, Suppliers},
        models::{subscription_plans::PlanDBResponse, suppliers::SupplierDBResponse},
    },
    payment_providers::{
        CheckoutSessionDetails, PaymentError, PaymentOutcome, PaymentProvider, PaymentSession, Result, WebhookEvent,
        record_confirmed_payment,
    },
};

/// Stripe payment provider
pub struct StripeProvider {
    api_key: String,
    webhook_secret: String,
    currency: String,
}

impl From<StripeConfig> for StripeProvider {
    fn from(config: StripeConfig) -> Self {
        Self {
            api_key: config.api_key,
            webhook_secret: config.webhook_secret,
            currency: config.currency,
        }
    }
}

impl StripeProvider {
    fn client(&self) -> Client {
        Client::new(&self.api_key)
    }

    fn currency(&self) -> Currency {
        self.currency.parse().unwrap_or_else(|_| {
            tracing::warn!("Unrecognized currency code {:?}, falling back to USD", self.currency);
            Currency::USD
        })
    }

    /// Plan prices are stored in major currency units; Stripe wants the
    /// smallest unit.
    fn unit_amount(price: Decimal) -> Result<i64> {
        (price * Decimal::ONE_HUNDRED)
            .round_dp(0)
            .to_i64()
            .ok_or_else(|| PaymentError::InvalidData(format!("Plan price {price} out of range")))
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_checkout_session(
        &self,
        db_pool: &PgPool,
        supplier: &SupplierDBResponse,
        plan: &PlanDBResponse,
        total: Decimal,
        cancel_url: &str,
        success_url: &str,
    ) -> Result<CheckoutSessionDetails> {
        let client = self.client();
        let supplier_ref = supplier.id.to_string();

        // The session carries everything needed to confirm the payment later:
        // the supplier in client_reference_id, the purchased duration in
        // metadata. Webhook processing never has to look the plan up again.
        let metadata: HashMap<String, String> = HashMap::from([
            ("duration_years".to_string(), plan.duration_years.to_string()),
            ("plan_label".to_string(), plan.label.clone()),
        ]);

        let mut checkout_params = CreateCheckoutSession {
            cancel_url: Some(cancel_url),
            success_url: Some(success_url),
            client_reference_id: Some(&supplier_ref),
            currency: Some(self.currency()),
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                    currency: self.currency(),
                    unit_amount: Some(Self::unit_amount(total)?),
                    product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                        name: format!("Supplier subscription: {}", plan.label),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                quantity: Some(1),
                ..Default::default()
            }]),
            metadata: Some(metadata),
            mode: Some(CheckoutSessionMode::Payment),
            ui_mode: Some(CheckoutSessionUiMode::Hosted),
            customer_creation: Some(CheckoutSessionCustomerCreation::Always),
            expand: &["line_items"],
            ..Default::default()
        };

        // Reuse the gateway customer from a previous session if we have one.
        if let Some(existing_id) = &supplier.payment_provider_id {
            tracing::debug!("Using existing Stripe customer {} for supplier {}", existing_id, supplier.id);
            checkout_params.customer = Some(
                existing_id
                    .parse()
                    .map_err(|_| PaymentError::InvalidData(format!("Invalid stored Stripe customer ID {existing_id:?}")))?,
            );
        } else {
            checkout_params.customer_email = Some(&supplier.email);
        }

        let checkout_session = CheckoutSession::create(&client, checkout_params).await.map_err(|e| {
            tracing::error!("Failed to create Stripe checkout session: {:?}", e);
            PaymentError::ProviderApi(e.to_string())
        })?;

        tracing::info!("Created checkout session {} for supplier {}", checkout_session.id, supplier.id);

        // Persist a freshly minted customer id for the next session.
        if supplier.payment_provider_id.is_none() {
            if let Some(customer) = &checkout_session.customer {
                let mut conn = db_pool.acquire().await?;
                Suppliers::new(&mut conn)
                    .set_payment_provider_id(supplier.id, customer.id().as_str())
                    .await?;
            }
        }

        let url = checkout_session.url.ok_or_else(|| {
            tracing::error!("Checkout session {} missing URL", checkout_session.id);
            PaymentError::ProviderApi("Checkout session missing URL".to_string())
        })?;

        Ok(CheckoutSessionDetails {
            session_id: checkout_session.id.to_string(),
            url,
        })
    }

    async fn get_payment_session(&self, session_id: &str) -> Result<PaymentSession> {
        let client = self.client();

        let session_id: stripe::CheckoutSessionId = session_id
            .parse()
            .map_err(|_| PaymentError::InvalidData("Invalid Stripe session ID".to_string()))?;

        let checkout_session = CheckoutSession::retrieve(&client, &session_id, &["line_items"])
            .await
            .map_err(|e| {
                tracing::error!("Failed to retrieve Stripe checkout session: {:?}", e);
                PaymentError::ProviderApi(e.to_string())
            })?;

        let supplier_id = checkout_session.client_reference_id.ok_or_else(|| {
            tracing::error!("Checkout session missing client_reference_id");
            PaymentError::InvalidData("Missing client_reference_id".to_string())
        })?;

        let duration_years = checkout_session
            .metadata
            .as_ref()
            .and_then(|m| m.get("duration_years"))
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                tracing::error!("Checkout session missing duration_years metadata");
                PaymentError::InvalidData("Missing duration_years in session metadata".to_string())
            })?;

        let amount_cents = checkout_session
            .line_items
            .and_then(|items| items.data.first().map(|item| item.amount_total))
            .or(checkout_session.amount_total)
            .ok_or_else(|| {
                tracing::error!("Checkout session missing both line_items and amount_total");
                PaymentError::InvalidData("Missing payment amount".to_string())
            })?;

        Ok(PaymentSession {
            supplier_id,
            amount: Decimal::new(amount_cents, 2),
            duration_years,
            is_paid: checkout_session.payment_status == CheckoutSessionPaymentStatus::Paid,
        })
    }

    async fn process_payment_session(&self, db_pool: &PgPool, session_id: &str) -> Result<Option<PaymentOutcome>> {
        // Fast path before any Stripe API call: duplicate webhook deliveries
        // and user retries are common, and the session may already be
        // recorded.
        {
            let mut conn = db_pool.acquire().await?;
            if Payments::new(&mut conn).get_by_source_id(session_id).await?.is_some() {
                tracing::trace!("Payment for session {} already recorded, skipping (fast path)", session_id);
                return Ok(None);
            }
        }

        let session = self.get_payment_session(session_id).await?;
        record_confirmed_payment(db_pool, session_id, &session).await
    }

    async fn validate_webhook(&self, headers: &axum::http::HeaderMap, body: &str) -> Result<Option<WebhookEvent>> {
        let signature = headers
            .get("stripe-signature")
            .ok_or_else(|| {
                tracing::warn!("Missing stripe-signature header");
                PaymentError::InvalidData("Missing stripe-signature header".to_string())
            })?
            .to_str()
            .map_err(|e| {
                tracing::warn!("Invalid stripe-signature header: {:?}", e);
                PaymentError::InvalidData("Invalid stripe-signature header".to_string())
            })?;

        let event = stripe::Webhook::construct_event(body, signature, &self.webhook_secret).map_err(|e| {
            tracing::warn!("Failed to construct webhook event: {:?}", e);
            PaymentError::InvalidData(format!("Webhook validation failed: {e}"))
        })?;

        tracing::trace!("Validated Stripe webhook event: {}", event.type_);

        let session_id = match &event.data.object {
            stripe::EventObject::CheckoutSession(session) => Some(session.id.to_string()),
            _ => None,
        };

        Ok(Some(WebhookEvent {
            event_type: event.type_.to_string(),
            session_id,
        }))
    }

    async fn process_webhook_event(&self, db_pool: &PgPool, event: &WebhookEvent) -> Result<Option<PaymentOutcome>> {
        if event.event_type != "checkout.session.completed" && event.event_type != "checkout.session.async_payment_succeeded" {
            tracing::debug!("Ignoring webhook event type: {}", event.event_type);
            return Ok(None);
        }

        let session_id = event.session_id.as_ref().ok_or_else(|| {
            tracing::error!("Webhook event missing session_id");
            PaymentError::InvalidData("Missing session_id in webhook event".to_string())
        })?;

        tracing::trace!("Processing webhook event {} for session {}", event.event_type, session_id);

        self.process_payment_session(db_pool, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::Repository, models::payments::PaymentCreateDBRequest};
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn provider() -> StripeProvider {
        StripeProvider::from(StripeConfig {
            api_key: "sk_test_fake".to_string(),
            webhook_secret: "whsec_fake".to_string(),
            currency: "usd".to_string(),
        })
    }

    #[test]
    fn test_unit_amount_conversion() {
        assert_eq!(StripeProvider::unit_amount(Decimal::new(1000, 0)).unwrap(), 100_000);
        assert_eq!(StripeProvider::unit_amount(Decimal::new(1999, 2)).unwrap(), 1999);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_idempotency_fast_path(pool: PgPool) {
        // A session recorded once must not trigger another Stripe API call or
        // a second payment row.
        let supplier = crate::test_utils::create_test_supplier(&pool, "stripe-fast@example.com").await;
        let session_id = "cs_test_fake_session_123";

        let mut conn = pool.acquire().await.unwrap();
        Payments::new(&mut conn)
            .create(&PaymentCreateDBRequest {
                supplier_id: supplier.id,
                source_id: session_id.to_string(),
                amount: Decimal::new(1000, 0),
                duration_years: 1,
            })
            .await
            .unwrap();
        drop(conn);

        // The fake API key is never used: the fast path returns before any
        // gateway call.
        let result = provider().process_payment_session(&pool, session_id).await.unwrap();
        assert!(result.is_none());

        let mut conn = pool.acquire().await.unwrap();
        let recorded = Payments::new(&mut conn).get_by_source_id(session_id).await.unwrap();
        assert!(recorded.is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_webhook_ignores_unrelated_events(pool: PgPool) {
        let event = WebhookEvent {
            event_type: "invoice.paid".to_string(),
            session_id: Some("cs_test_123".to_string()),
        };

        let result = provider().process_webhook_event(&pool, &event).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_webhook_rejects_missing_signature() {
        let headers = axum::http::HeaderMap::new();
        let err = provider().validate_webhook(&headers, "{}").await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidData(_)));
    }
}
