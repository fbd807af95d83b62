//! Database repository for subscription plans and the singleton settings row.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::subscription_plans::{PlanCreateDBRequest, PlanDBResponse, PlanUpdateDBRequest, SubscriptionSettingsDBResponse},
    },
    types::{PlanId, abbrev_uuid},
};

/// Filter for listing subscription plans
#[derive(Debug, Clone)]
pub struct PlanFilter {
    /// When true, only plans a supplier can currently buy
    pub active_only: bool,
}

pub struct SubscriptionPlans<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for SubscriptionPlans<'c> {
    type CreateRequest = PlanCreateDBRequest;
    type UpdateRequest = PlanUpdateDBRequest;
    type Response = PlanDBResponse;
    type Id = PlanId;
    type Filter = PlanFilter;

    #[instrument(skip(self, request), fields(label = %request.label), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let plan = sqlx::query_as!(
            PlanDBResponse,
            r#"
            INSERT INTO subscription_plans (id, label, duration_years, price, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, label, duration_years, price, active, created_at, updated_at
            "#,
            Uuid::new_v4(),
            request.label,
            request.duration_years,
            request.price,
            request.active,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(plan)
    }

    #[instrument(skip(self), fields(plan_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let plan = sqlx::query_as!(
            PlanDBResponse,
            "SELECT id, label, duration_years, price, active, created_at, updated_at FROM subscription_plans WHERE id = $1",
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(plan)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let plans = sqlx::query_as!(
            PlanDBResponse,
            "SELECT id, label, duration_years, price, active, created_at, updated_at FROM subscription_plans WHERE id = ANY($1)",
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(plans.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let plans = sqlx::query_as!(
            PlanDBResponse,
            r#"
            SELECT id, label, duration_years, price, active, created_at, updated_at
            FROM subscription_plans
            WHERE (NOT $1::bool OR active)
            ORDER BY duration_years
            "#,
            filter.active_only
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(plans)
    }

    #[instrument(skip(self), fields(plan_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM subscription_plans WHERE id = $1", id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(plan_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let plan = sqlx::query_as!(
            PlanDBResponse,
            r#"
            UPDATE subscription_plans SET
                label = COALESCE($2, label),
                duration_years = COALESCE($3, duration_years),
                price = COALESCE($4, price),
                active = COALESCE($5, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, label, duration_years, price, active, created_at, updated_at
            "#,
            id,
            request.label.as_deref(),
            request.duration_years,
            request.price,
            request.active,
        )
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(plan)
    }
}

impl<'c> SubscriptionPlans<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Read the singleton settings row. The row is created by a migration, so
    /// a missing row is a real error.
    #[instrument(skip(self), err)]
    pub async fn get_settings(&mut self) -> Result<SubscriptionSettingsDBResponse> {
        let settings = sqlx::query_as!(
            SubscriptionSettingsDBResponse,
            "SELECT registration_fee, updated_at FROM subscription_settings"
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(settings)
    }

    #[instrument(skip(self), err)]
    pub async fn set_registration_fee(&mut self, fee: Decimal) -> Result<SubscriptionSettingsDBResponse> {
        let settings = sqlx::query_as!(
            SubscriptionSettingsDBResponse,
            r#"
            UPDATE subscription_settings SET registration_fee = $1, updated_at = NOW()
            RETURNING registration_fee, updated_at
            "#,
            fee
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(settings)
    }
}
