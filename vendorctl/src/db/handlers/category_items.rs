//! Database repository for category items.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::category_items::{CategoryItemCreateDBRequest, CategoryItemDBResponse},
    },
    types::{CategoryItemId, abbrev_uuid},
};

/// Filter for listing category items
#[derive(Debug, Clone)]
pub struct CategoryItemFilter {
    pub category: Option<String>,
}

pub struct CategoryItems<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for CategoryItems<'c> {
    type CreateRequest = CategoryItemCreateDBRequest;
    // Items are replaced, not edited: delete and re-create.
    type UpdateRequest = ();
    type Response = CategoryItemDBResponse;
    type Id = CategoryItemId;
    type Filter = CategoryItemFilter;

    #[instrument(skip(self, request), fields(category = %request.category, name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let item = sqlx::query_as!(
            CategoryItemDBResponse,
            r#"
            INSERT INTO category_items (id, category, name)
            VALUES ($1, $2, $3)
            RETURNING id, category, name, created_at
            "#,
            Uuid::new_v4(),
            request.category,
            request.name,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(item)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let item = sqlx::query_as!(
            CategoryItemDBResponse,
            "SELECT id, category, name, created_at FROM category_items WHERE id = $1",
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(item)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let items = sqlx::query_as!(
            CategoryItemDBResponse,
            "SELECT id, category, name, created_at FROM category_items WHERE id = ANY($1)",
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(items.into_iter().map(|i| (i.id, i)).collect())
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let items = sqlx::query_as!(
            CategoryItemDBResponse,
            r#"
            SELECT id, category, name, created_at
            FROM category_items
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY category, name
            "#,
            filter.category.as_deref()
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(items)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM category_items WHERE id = $1", id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update(&mut self, _id: Self::Id, _request: &Self::UpdateRequest) -> Result<Self::Response> {
        Err(DbError::Other(anyhow::anyhow!("category items are replaced, not updated")))
    }
}

impl<'c> CategoryItems<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_name_within_category_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = CategoryItems::new(&mut conn);

        let request = CategoryItemCreateDBRequest {
            category: "countries".to_string(),
            name: "Jordan".to_string(),
        };
        repo.create(&request).await.unwrap();
        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // Same name in a different category is fine
        repo.create(&CategoryItemCreateDBRequest {
            category: "business_types".to_string(),
            name: "Jordan".to_string(),
        })
        .await
        .unwrap();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_sorted_by_name(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = CategoryItems::new(&mut conn);

        for name in ["Networking", "Cabling", "Security"] {
            repo.create(&CategoryItemCreateDBRequest {
                category: "supply_categories".to_string(),
                name: name.to_string(),
            })
            .await
            .unwrap();
        }

        let items = repo
            .list(&CategoryItemFilter {
                category: Some("supply_categories".to_string()),
            })
            .await
            .unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Cabling", "Networking", "Security"]);
    }
}
