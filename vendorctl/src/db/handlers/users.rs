//! Database repository for login accounts.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    api::models::users::Role,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
    types::{SupplierId, UserId, abbrev_uuid},
};

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user_id = Uuid::new_v4();

        let user = sqlx::query_as!(
            UserDBResponse,
            r#"
            INSERT INTO users (id, username, email, password_hash, role, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password_hash, role AS "role: _", supplier_id, created_at, updated_at
            "#,
            user_id,
            request.username,
            request.email,
            request.password_hash,
            request.role as Role,
            request.supplier_id,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as!(
            UserDBResponse,
            r#"
            SELECT id, username, email, password_hash, role AS "role: _", supplier_id, created_at, updated_at
            FROM users WHERE id = $1
            "#,
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = sqlx::query_as!(
            UserDBResponse,
            r#"
            SELECT id, username, email, password_hash, role AS "role: _", supplier_id, created_at, updated_at
            FROM users WHERE id = ANY($1)
            "#,
            ids.as_slice()
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as!(
            UserDBResponse,
            r#"
            SELECT id, username, email, password_hash, role AS "role: _", supplier_id, created_at, updated_at
            FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2
            "#,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM users WHERE id = $1", id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as!(
            UserDBResponse,
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, role AS "role: _", supplier_id, created_at, updated_at
            "#,
            id,
            request.username.as_deref(),
            request.password_hash.as_deref(),
        )
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as!(
            UserDBResponse,
            r#"
            SELECT id, username, email, password_hash, role AS "role: _", supplier_id, created_at, updated_at
            FROM users WHERE email = $1
            "#,
            email
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(supplier_id = %abbrev_uuid(&supplier_id)), err)]
    pub async fn get_by_supplier_id(&mut self, supplier_id: SupplierId) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as!(
            UserDBResponse,
            r#"
            SELECT id, username, email, password_hash, role AS "role: _", supplier_id, created_at, updated_at
            FROM users WHERE supplier_id = $1
            "#,
            supplier_id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use sqlx::PgPool;

    fn admin_request(email: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: "admin".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role: Role::Admin,
            supplier_id: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_fetch_by_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&admin_request("admin@example.com")).await.unwrap();
        let found = repo.get_user_by_email("admin@example.com").await.unwrap().unwrap();

        assert_eq!(found.id, created.id);
        assert_eq!(found.role, Role::Admin);
        assert!(found.supplier_id.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&admin_request("same@example.com")).await.unwrap();
        let err = repo.create(&admin_request("same@example.com")).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_password_hash(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&admin_request("rotate@example.com")).await.unwrap();
        let updated = repo
            .update(
                created.id,
                &UserUpdateDBRequest {
                    username: None,
                    password_hash: Some("$argon2id$new".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.password_hash, "$argon2id$new");
        assert_eq!(updated.username, created.username);
    }
}
