//! Database repository for password setup/reset tokens.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::password,
    config::Config,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::password_tokens::{
            PasswordToken, PasswordTokenCreateRequest, PasswordTokenFilter, PasswordTokenResponse, PasswordTokenUpdateRequest,
            TokenPurpose,
        },
    },
    types::{SupplierId, TokenId, UserId, abbrev_uuid},
};

pub struct PasswordTokens<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for PasswordTokens<'c> {
    type CreateRequest = PasswordTokenCreateRequest;
    type UpdateRequest = PasswordTokenUpdateRequest;
    type Response = PasswordTokenResponse;
    type Id = TokenId;
    type Filter = PasswordTokenFilter;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let token_hash = password::hash_string_with_params(&request.raw_token, Some(request.argon2_params))
            .map_err(|e| DbError::Other(anyhow::anyhow!(e)))?;

        let token = sqlx::query_as!(
            PasswordToken,
            r#"
            INSERT INTO password_tokens (supplier_id, user_id, token_hash, purpose, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, supplier_id, user_id, token_hash, purpose AS "purpose: _", expires_at, created_at, used_at
            "#,
            request.supplier_id,
            request.user_id,
            token_hash,
            request.purpose as TokenPurpose,
            request.expires_at
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(token)
    }

    #[instrument(skip(self, id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let token = sqlx::query_as!(
            PasswordToken,
            r#"
            SELECT id, supplier_id, user_id, token_hash, purpose AS "purpose: _", expires_at, created_at, used_at
            FROM password_tokens WHERE id = $1
            "#,
            id
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(token)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let tokens = sqlx::query_as!(
            PasswordToken,
            r#"
            SELECT id, supplier_id, user_id, token_hash, purpose AS "purpose: _", expires_at, created_at, used_at
            FROM password_tokens WHERE id = ANY($1)
            "#,
            &ids
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(tokens.into_iter().map(|t| (t.id, t)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let tokens = sqlx::query_as!(
            PasswordToken,
            r#"
            SELECT id, supplier_id, user_id, token_hash, purpose AS "purpose: _", expires_at, created_at, used_at
            FROM password_tokens
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC LIMIT $2 OFFSET $3
            "#,
            filter.user_id,
            filter.limit,
            filter.skip
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(tokens)
    }

    #[instrument(skip(self, id, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let token = sqlx::query_as!(
            PasswordToken,
            r#"
            UPDATE password_tokens
            SET used_at = COALESCE($2, used_at)
            WHERE id = $1
            RETURNING id, supplier_id, user_id, token_hash, purpose AS "purpose: _", expires_at, created_at, used_at
            "#,
            id,
            request.used_at
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(token)
    }

    #[instrument(skip(self, id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query!("DELETE FROM password_tokens WHERE id = $1", id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> PasswordTokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Create a setup token for an approved supplier. The raw token goes into
    /// the welcome email; only its hash is stored.
    #[instrument(skip(self, config), fields(supplier_id = %abbrev_uuid(&supplier_id)), err)]
    pub async fn create_for_supplier(&mut self, supplier_id: SupplierId, config: &Config) -> Result<(String, PasswordToken)> {
        let raw_token = password::generate_token();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(config.auth.setup_token_duration).unwrap_or(chrono::Duration::hours(72));

        let request = PasswordTokenCreateRequest {
            supplier_id: Some(supplier_id),
            user_id: None,
            raw_token: raw_token.clone(),
            purpose: TokenPurpose::Setup,
            expires_at,
            argon2_params: config.auth.argon2_params(),
        };

        let token = self.create(&request).await?;
        Ok((raw_token, token))
    }

    /// Create a reset token for an existing account
    #[instrument(skip(self, config), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn create_for_user(&mut self, user_id: UserId, config: &Config) -> Result<(String, PasswordToken)> {
        let raw_token = password::generate_token();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(config.auth.reset_token_duration).unwrap_or(chrono::Duration::minutes(30));

        let request = PasswordTokenCreateRequest {
            supplier_id: None,
            user_id: Some(user_id),
            raw_token: raw_token.clone(),
            purpose: TokenPurpose::Reset,
            expires_at,
            argon2_params: config.auth.argon2_params(),
        };

        let token = self.create(&request).await?;
        Ok((raw_token, token))
    }

    /// Find a live token by ID and verify the raw token against its hash.
    /// Returns None for unknown, expired, used, or wrong-purpose tokens.
    #[instrument(skip(self, raw_token), err)]
    pub async fn find_valid_token(&mut self, token_id: TokenId, raw_token: &str, purpose: TokenPurpose) -> Result<Option<PasswordToken>> {
        let token = self.get_by_id(token_id).await?;

        if let Some(token) = token {
            if token.purpose != purpose {
                return Ok(None);
            }
            if token.used_at.is_some() {
                return Ok(None);
            }
            if Utc::now() > token.expires_at {
                return Ok(None);
            }

            match password::verify_string(raw_token, &token.token_hash) {
                Ok(true) => Ok(Some(token)),
                Ok(false) => Ok(None),
                Err(e) => {
                    tracing::error!("Token verification error for token {}: {:?}", token_id, e);
                    Ok(None)
                }
            }
        } else {
            Ok(None)
        }
    }

    /// Invalidate all outstanding reset tokens for a user
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn invalidate_for_user(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query!(
            r#"
            UPDATE password_tokens
            SET used_at = NOW()
            WHERE user_id = $1 AND used_at IS NULL
            "#,
            user_id
        )
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_setup_token_roundtrip(pool: PgPool) {
        let config = crate::test_utils::create_test_config();
        let supplier = crate::test_utils::create_test_supplier(&pool, "token@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = PasswordTokens::new(&mut conn);

        let (raw, token) = repo.create_for_supplier(supplier.id, &config).await.unwrap();
        assert_eq!(token.purpose, TokenPurpose::Setup);
        assert_ne!(raw, token.token_hash);

        // Valid raw token resolves, wrong one does not
        let found = repo.find_valid_token(token.id, &raw, TokenPurpose::Setup).await.unwrap();
        assert!(found.is_some());
        let missing = repo.find_valid_token(token.id, "wrong-token", TokenPurpose::Setup).await.unwrap();
        assert!(missing.is_none());

        // Wrong purpose is rejected outright
        let wrong_purpose = repo.find_valid_token(token.id, &raw, TokenPurpose::Reset).await.unwrap();
        assert!(wrong_purpose.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_used_token_is_rejected(pool: PgPool) {
        let config = crate::test_utils::create_test_config();
        let supplier = crate::test_utils::create_test_supplier(&pool, "used@example.com").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = PasswordTokens::new(&mut conn);

        let (raw, token) = repo.create_for_supplier(supplier.id, &config).await.unwrap();
        repo.update(
            token.id,
            &PasswordTokenUpdateRequest {
                used_at: Some(Utc::now()),
            },
        )
        .await
        .unwrap();

        let found = repo.find_valid_token(token.id, &raw, TokenPurpose::Setup).await.unwrap();
        assert!(found.is_none());
    }
}
