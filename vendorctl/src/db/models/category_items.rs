//! Database models for category items (form dropdown options).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::CategoryItemId;

/// Database request for creating a category item
#[derive(Debug, Clone)]
pub struct CategoryItemCreateDBRequest {
    pub category: String,
    pub name: String,
}

/// Database response for a category item
#[derive(Debug, Clone, FromRow)]
pub struct CategoryItemDBResponse {
    pub id: CategoryItemId,
    pub category: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
