//! API request/response models for category items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::category_items::CategoryItemDBResponse;
use crate::types::CategoryItemId;

/// Admin request to add a dropdown option. The target category comes from the
/// request path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryItemCreate {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryItemResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CategoryItemId,
    pub category: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryItemDBResponse> for CategoryItemResponse {
    fn from(item: CategoryItemDBResponse) -> Self {
        Self {
            id: item.id,
            category: item.category,
            name: item.name,
            created_at: item.created_at,
        }
    }
}
