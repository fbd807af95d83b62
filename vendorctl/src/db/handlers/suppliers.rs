//! Database repository for suppliers.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    api::models::suppliers::SupplierStatus,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::suppliers::{SupplierCreateDBRequest, SupplierDBResponse, SupplierPaymentCompletion, SupplierUpdateDBRequest},
    },
    types::{SupplierId, abbrev_uuid},
};

/// Filter for listing suppliers in the review console
#[derive(Debug, Clone)]
pub struct SupplierFilter {
    /// Substring match over company name, contact name, email, and reference
    pub search: Option<String>,
    pub status: Option<SupplierStatus>,
    pub skip: i64,
    pub limit: i64,
}

/// Filter for the payments dashboard. Unlike [`SupplierFilter`] this is not
/// paginated at the SQL level: the derived subscription bucket is computed
/// against an injectable clock, so bucket filtering and pagination happen on
/// the fetched rows.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub search: Option<String>,
    pub status: Option<SupplierStatus>,
    pub business_type: Option<String>,
    pub payment_from: Option<chrono::DateTime<chrono::Utc>>,
    pub payment_to: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct Suppliers<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Suppliers<'c> {
    type CreateRequest = SupplierCreateDBRequest;
    type UpdateRequest = SupplierUpdateDBRequest;
    type Response = SupplierDBResponse;
    type Id = SupplierId;
    type Filter = SupplierFilter;

    #[instrument(skip(self, request), fields(company = %request.company_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let supplier_id = Uuid::new_v4();

        let supplier = sqlx::query_as!(
            SupplierDBResponse,
            r#"
            INSERT INTO suppliers (
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted,
                status AS "status: _", rejection_reason, payment_status AS "payment_status: _",
                subscription_duration_years, payment_amount, payment_date, subscription_expires_at,
                payment_provider_id, created_at, updated_at
            "#,
            supplier_id,
            request.reference,
            request.company_name,
            request.contact_name,
            request.email,
            request.phone,
            request.country,
            request.city,
            request.business_type,
            request.website,
            request.description,
            &request.categories,
            request.terms_accepted,
            request.privacy_accepted,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(supplier)
    }

    #[instrument(skip(self), fields(supplier_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let supplier = sqlx::query_as!(
            SupplierDBResponse,
            r#"
            SELECT
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted,
                status AS "status: _", rejection_reason, payment_status AS "payment_status: _",
                subscription_duration_years, payment_amount, payment_date, subscription_expires_at,
                payment_provider_id, created_at, updated_at
            FROM suppliers WHERE id = $1
            "#,
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(supplier)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let suppliers = sqlx::query_as!(
            SupplierDBResponse,
            r#"
            SELECT
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted,
                status AS "status: _", rejection_reason, payment_status AS "payment_status: _",
                subscription_duration_years, payment_amount, payment_date, subscription_expires_at,
                payment_provider_id, created_at, updated_at
            FROM suppliers WHERE id = ANY($1)
            "#,
            ids.as_slice()
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(suppliers.into_iter().map(|s| (s.id, s)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));

        // $1/$2 are NULL-disabled filters, matching the count() query below.
        let suppliers = sqlx::query_as!(
            SupplierDBResponse,
            r#"
            SELECT
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted,
                status AS "status: _", rejection_reason, payment_status AS "payment_status: _",
                subscription_duration_years, payment_amount, payment_date, subscription_expires_at,
                payment_provider_id, created_at, updated_at
            FROM suppliers
            WHERE ($1::text IS NULL
                   OR company_name ILIKE $1 OR contact_name ILIKE $1
                   OR email ILIKE $1 OR reference ILIKE $1)
              AND ($2::supplier_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            search.as_deref(),
            filter.status.clone() as Option<SupplierStatus>,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(suppliers)
    }

    #[instrument(skip(self), fields(supplier_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM suppliers WHERE id = $1", id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(supplier_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Editing the subscription duration recomputes the stored expiry from
        // the recorded payment date, so the derived field never goes stale.
        let supplier = sqlx::query_as!(
            SupplierDBResponse,
            r#"
            UPDATE suppliers SET
                company_name = COALESCE($2, company_name),
                contact_name = COALESCE($3, contact_name),
                phone = COALESCE($4, phone),
                country = COALESCE($5, country),
                city = COALESCE($6, city),
                business_type = COALESCE($7, business_type),
                website = COALESCE($8, website),
                description = COALESCE($9, description),
                categories = COALESCE($10, categories),
                subscription_duration_years = COALESCE($11, subscription_duration_years),
                subscription_expires_at = CASE
                    WHEN $11::int IS NOT NULL AND payment_date IS NOT NULL
                    THEN payment_date + make_interval(years => $11)
                    ELSE subscription_expires_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted,
                status AS "status: _", rejection_reason, payment_status AS "payment_status: _",
                subscription_duration_years, payment_amount, payment_date, subscription_expires_at,
                payment_provider_id, created_at, updated_at
            "#,
            id,
            request.company_name.as_deref(),
            request.contact_name.as_deref(),
            request.phone.as_deref(),
            request.country.as_deref(),
            request.city.as_deref(),
            request.business_type.as_deref(),
            request.website.as_deref(),
            request.description.as_deref(),
            request.categories.as_deref(),
            request.subscription_duration_years,
        )
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(supplier)
    }
}

impl<'c> Suppliers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Total row count for the given filter, for pagination envelopes
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &SupplierFilter) -> Result<i64> {
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));

        let count = sqlx::query_scalar!(
            r#"
            SELECT COUNT(*) AS "count!"
            FROM suppliers
            WHERE ($1::text IS NULL
                   OR company_name ILIKE $1 OR contact_name ILIKE $1
                   OR email ILIKE $1 OR reference ILIKE $1)
              AND ($2::supplier_status IS NULL OR status = $2)
            "#,
            search.as_deref(),
            filter.status.clone() as Option<SupplierStatus>,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }

    /// Transition a supplier's review status. Clears any previous rejection
    /// reason unless the transition itself is a rejection.
    #[instrument(skip(self), fields(supplier_id = %abbrev_uuid(&id), status = ?status), err)]
    pub async fn set_status(&mut self, id: SupplierId, status: SupplierStatus, rejection_reason: Option<&str>) -> Result<SupplierDBResponse> {
        let supplier = sqlx::query_as!(
            SupplierDBResponse,
            r#"
            UPDATE suppliers SET
                status = $2,
                rejection_reason = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted,
                status AS "status: _", rejection_reason, payment_status AS "payment_status: _",
                subscription_duration_years, payment_amount, payment_date, subscription_expires_at,
                payment_provider_id, created_at, updated_at
            "#,
            id,
            status as SupplierStatus,
            rejection_reason,
        )
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(supplier)
    }

    /// Mark a supplier's payment completed and record the subscription window
    #[instrument(skip(self, completion), fields(supplier_id = %abbrev_uuid(&id)), err)]
    pub async fn complete_payment(&mut self, id: SupplierId, completion: &SupplierPaymentCompletion) -> Result<SupplierDBResponse> {
        let supplier = sqlx::query_as!(
            SupplierDBResponse,
            r#"
            UPDATE suppliers SET
                payment_status = 'completed',
                payment_amount = $2,
                payment_date = $3,
                subscription_duration_years = $4,
                subscription_expires_at = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted,
                status AS "status: _", rejection_reason, payment_status AS "payment_status: _",
                subscription_duration_years, payment_amount, payment_date, subscription_expires_at,
                payment_provider_id, created_at, updated_at
            "#,
            id,
            completion.amount,
            completion.payment_date,
            completion.duration_years,
            completion.expires_at,
        )
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(supplier)
    }

    /// Store the payment gateway's customer id for a supplier
    #[instrument(skip(self, provider_id), fields(supplier_id = %abbrev_uuid(&id)), err)]
    pub async fn set_payment_provider_id(&mut self, id: SupplierId, provider_id: &str) -> Result<()> {
        sqlx::query!(
            "UPDATE suppliers SET payment_provider_id = $2, updated_at = NOW() WHERE id = $1",
            id,
            provider_id
        )
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    /// Fetch suppliers for the payments dashboard, SQL-side filters applied,
    /// ordered by payment date (newest first, unpaid rows last)
    #[instrument(skip(self, filter), err)]
    pub async fn list_for_dashboard(&mut self, filter: &DashboardFilter) -> Result<Vec<SupplierDBResponse>> {
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));

        let suppliers = sqlx::query_as!(
            SupplierDBResponse,
            r#"
            SELECT
                id, reference, company_name, contact_name, email, phone, country, city,
                business_type, website, description, categories, terms_accepted, privacy_accepted,
                status AS "status: _", rejection_reason, payment_status AS "payment_status: _",
                subscription_duration_years, payment_amount, payment_date, subscription_expires_at,
                payment_provider_id, created_at, updated_at
            FROM suppliers
            WHERE ($1::text IS NULL OR company_name ILIKE $1 OR contact_name ILIKE $1 OR email ILIKE $1)
              AND ($2::supplier_status IS NULL OR status = $2)
              AND ($3::text IS NULL OR business_type = $3)
              AND ($4::timestamptz IS NULL OR payment_date >= $4)
              AND ($5::timestamptz IS NULL OR payment_date <= $5)
            ORDER BY payment_date DESC NULLS LAST, created_at DESC
            "#,
            search.as_deref(),
            filter.status.clone() as Option<SupplierStatus>,
            filter.business_type.as_deref(),
            filter.payment_from,
            filter.payment_to,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(suppliers)
    }

}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::api::models::suppliers::PaymentStatus;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn registration(company: &str, email: &str) -> SupplierCreateDBRequest {
        SupplierCreateDBRequest {
            reference: format!("SUP-{}", &Uuid::new_v4().to_string()[..8].to_uppercase()),
            company_name: company.to_string(),
            contact_name: "Jordan Example".to_string(),
            email: email.to_string(),
            phone: "+971-50-000-0000".to_string(),
            country: "United Arab Emirates".to_string(),
            city: Some("Dubai".to_string()),
            business_type: "Distributor".to_string(),
            website: None,
            description: None,
            categories: vec!["Networking".to_string()],
            terms_accepted: true,
            privacy_accepted: true,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_supplier_defaults(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Suppliers::new(&mut conn);

        let supplier = repo.create(&registration("Acme Ltd", "acme@example.com")).await.unwrap();

        assert_eq!(supplier.status, SupplierStatus::PendingApproval);
        assert_eq!(supplier.payment_status, PaymentStatus::Pending);
        assert!(supplier.subscription_expires_at.is_none());
        assert!(supplier.reference.starts_with("SUP-"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Suppliers::new(&mut conn);

        repo.create(&registration("First Ltd", "dup@example.com")).await.unwrap();
        let err = repo.create(&registration("Second Ltd", "dup@example.com")).await.unwrap_err();

        match err {
            DbError::UniqueViolation { constraint, .. } => {
                assert_eq!(constraint.as_deref(), Some("suppliers_email_unique"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_status_and_search(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Suppliers::new(&mut conn);

        let a = repo.create(&registration("Alpha Networks", "alpha@example.com")).await.unwrap();
        repo.create(&registration("Beta Supplies", "beta@example.com")).await.unwrap();
        repo.set_status(a.id, SupplierStatus::Approved, None).await.unwrap();

        let approved = repo
            .list(&SupplierFilter {
                search: None,
                status: Some(SupplierStatus::Approved),
                skip: 0,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a.id);

        let found = repo
            .list(&SupplierFilter {
                search: Some("beta".to_string()),
                status: None,
                skip: 0,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].company_name, "Beta Supplies");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_complete_payment_records_subscription(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Suppliers::new(&mut conn);

        let supplier = repo.create(&registration("Paid Ltd", "paid@example.com")).await.unwrap();
        assert_eq!(supplier.payment_status, PaymentStatus::Pending);

        let payment_date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let expires_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let updated = repo
            .complete_payment(
                supplier.id,
                &SupplierPaymentCompletion {
                    amount: Decimal::new(1000, 0),
                    payment_date,
                    duration_years: 1,
                    expires_at,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.payment_status, PaymentStatus::Completed);
        assert_eq!(updated.subscription_expires_at, Some(expires_at));

        let fetched = repo.get_by_id(supplier.id).await.unwrap().unwrap();
        assert_eq!(fetched.payment_status, PaymentStatus::Completed);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_duration_recomputes_expiry(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Suppliers::new(&mut conn);

        let supplier = repo.create(&registration("Renewal Ltd", "renewal@example.com")).await.unwrap();
        let payment_date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        repo.complete_payment(
            supplier.id,
            &SupplierPaymentCompletion {
                amount: Decimal::new(1000, 0),
                payment_date,
                duration_years: 1,
                expires_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            },
        )
        .await
        .unwrap();

        let updated = repo
            .update(
                supplier.id,
                &SupplierUpdateDBRequest {
                    subscription_duration_years: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.subscription_duration_years, Some(3));
        assert_eq!(
            updated.subscription_expires_at,
            Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap())
        );
    }
}
