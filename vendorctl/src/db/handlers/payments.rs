//! Database repository for confirmed payments.
//!
//! The `payments_source_id_unique` constraint is the idempotency guard for
//! webhook processing: a checkout session can only ever be recorded once, no
//! matter how many replicas race on the same delivery.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::payments::{PaymentCreateDBRequest, PaymentDBResponse},
    },
    types::{PaymentId, SupplierId, abbrev_uuid},
};

/// Filter for listing payments
#[derive(Debug, Clone)]
pub struct PaymentFilter {
    pub supplier_id: Option<SupplierId>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Payments<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Payments<'c> {
    type CreateRequest = PaymentCreateDBRequest;
    // Payments are immutable once recorded.
    type UpdateRequest = ();
    type Response = PaymentDBResponse;
    type Id = PaymentId;
    type Filter = PaymentFilter;

    #[instrument(skip(self, request), fields(supplier_id = %abbrev_uuid(&request.supplier_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let payment = sqlx::query_as!(
            PaymentDBResponse,
            r#"
            INSERT INTO payments (id, supplier_id, source_id, amount, duration_years)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, supplier_id, source_id, amount, duration_years, created_at
            "#,
            Uuid::new_v4(),
            request.supplier_id,
            request.source_id,
            request.amount,
            request.duration_years,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(payment)
    }

    #[instrument(skip(self), fields(payment_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let payment = sqlx::query_as!(
            PaymentDBResponse,
            "SELECT id, supplier_id, source_id, amount, duration_years, created_at FROM payments WHERE id = $1",
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(payment)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let payments = sqlx::query_as!(
            PaymentDBResponse,
            "SELECT id, supplier_id, source_id, amount, duration_years, created_at FROM payments WHERE id = ANY($1)",
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(payments.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let payments = sqlx::query_as!(
            PaymentDBResponse,
            r#"
            SELECT id, supplier_id, source_id, amount, duration_years, created_at
            FROM payments
            WHERE ($1::uuid IS NULL OR supplier_id = $1)
            ORDER BY created_at DESC LIMIT $2 OFFSET $3
            "#,
            filter.supplier_id,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(payments)
    }

    #[instrument(skip(self), fields(payment_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM payments WHERE id = $1", id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(&mut self, _id: Self::Id, _request: &Self::UpdateRequest) -> Result<Self::Response> {
        Err(crate::db::errors::DbError::Other(anyhow::anyhow!("payments are immutable")))
    }
}

impl<'c> Payments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fast-path lookup by checkout session id, used before hitting the
    /// payment gateway on duplicate webhook deliveries
    #[instrument(skip(self, source_id), err)]
    pub async fn get_by_source_id(&mut self, source_id: &str) -> Result<Option<PaymentDBResponse>> {
        let payment = sqlx::query_as!(
            PaymentDBResponse,
            "SELECT id, supplier_id, source_id, amount, duration_years, created_at FROM payments WHERE source_id = $1",
            source_id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::db::errors::DbError;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_source_id_is_unique(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let supplier = crate::test_utils::create_test_supplier(&pool, "unique@example.com").await;
        let mut repo = Payments::new(&mut conn);

        let request = PaymentCreateDBRequest {
            supplier_id: supplier.id,
            source_id: "cs_test_once".to_string(),
            amount: Decimal::new(1500, 0),
            duration_years: 1,
        };

        repo.create(&request).await.unwrap();
        let err = repo.create(&request).await.unwrap_err();

        match err {
            DbError::UniqueViolation { constraint, .. } => {
                assert_eq!(constraint.as_deref(), Some("payments_source_id_unique"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }

        let found = repo.get_by_source_id("cs_test_once").await.unwrap();
        assert!(found.is_some());
    }
}
