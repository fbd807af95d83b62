//! Database repository for contact inquiries.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::contact_inquiries::{ContactInquiryCreateDBRequest, ContactInquiryDBResponse},
    },
    types::{InquiryId, abbrev_uuid},
};

/// Filter for listing contact inquiries
#[derive(Debug, Clone)]
pub struct InquiryFilter {
    pub skip: i64,
    pub limit: i64,
}

pub struct ContactInquiries<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for ContactInquiries<'c> {
    type CreateRequest = ContactInquiryCreateDBRequest;
    // Inquiries are read-only after submission.
    type UpdateRequest = ();
    type Response = ContactInquiryDBResponse;
    type Id = InquiryId;
    type Filter = InquiryFilter;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let inquiry = sqlx::query_as!(
            ContactInquiryDBResponse,
            r#"
            INSERT INTO contact_inquiries (id, name, company, email, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, company, email, message, created_at
            "#,
            Uuid::new_v4(),
            request.name,
            request.company,
            request.email,
            request.message,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(inquiry)
    }

    #[instrument(skip(self), fields(inquiry_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let inquiry = sqlx::query_as!(
            ContactInquiryDBResponse,
            "SELECT id, name, company, email, message, created_at FROM contact_inquiries WHERE id = $1",
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(inquiry)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let inquiries = sqlx::query_as!(
            ContactInquiryDBResponse,
            "SELECT id, name, company, email, message, created_at FROM contact_inquiries WHERE id = ANY($1)",
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(inquiries.into_iter().map(|i| (i.id, i)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let inquiries = sqlx::query_as!(
            ContactInquiryDBResponse,
            "SELECT id, name, company, email, message, created_at FROM contact_inquiries ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(inquiries)
    }

    #[instrument(skip(self), fields(inquiry_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM contact_inquiries WHERE id = $1", id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(&mut self, _id: Self::Id, _request: &Self::UpdateRequest) -> Result<Self::Response> {
        Err(DbError::Other(anyhow::anyhow!("contact inquiries are immutable")))
    }
}

impl<'c> ContactInquiries<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Total inquiry count, for pagination envelopes
    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar!(r#"SELECT COUNT(*) AS "count!" FROM contact_inquiries"#)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}
