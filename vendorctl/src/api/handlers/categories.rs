//! Category item handlers: public lookup lists for the registration form and
//! admin management of those lists.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::categories::{CategoryItemCreate, CategoryItemResponse},
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        handlers::{CategoryItemFilter, CategoryItems, Repository},
        models::category_items::CategoryItemCreateDBRequest,
    },
    errors::Error,
    types::CategoryItemId,
};

/// List the items of a lookup category
///
/// Public: the registration form uses this for its category and
/// business-type dropdowns. Items come back sorted by name.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{category}/items",
    params(("category" = String, Path, description = "Category key, e.g. `product_category` or `business_type`")),
    tag = "categories",
    responses(
        (status = 200, description = "Items in the category", body = Vec<CategoryItemResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_category_items(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<CategoryItemResponse>>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let items = CategoryItems::new(&mut pool_conn)
        .list(&CategoryItemFilter {
            category: Some(category),
        })
        .await?;

    Ok(Json(items.into_iter().map(CategoryItemResponse::from).collect()))
}

/// Add a category item (admin)
#[utoipa::path(
    post,
    path = "/admin/api/v1/categories/{category}/items",
    params(("category" = String, Path, description = "Category key")),
    request_body = CategoryItemCreate,
    tag = "categories",
    responses(
        (status = 201, description = "Item created", body = CategoryItemResponse),
        (status = 409, description = "Item already exists in this category"),
        (status = 422, description = "Missing category or name"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_category_item(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Categories, operation::CreateAll>,
    Path(category): Path<String>,
    Json(item): Json<CategoryItemCreate>,
) -> Result<(StatusCode, Json<CategoryItemResponse>), Error> {
    if category.trim().is_empty() || item.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Category and name are required".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let created = CategoryItems::new(&mut pool_conn)
        .create(&CategoryItemCreateDBRequest { category, name: item.name })
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryItemResponse::from(created))))
}

/// Delete a category item (admin)
#[utoipa::path(
    delete,
    path = "/admin/api/v1/categories/{category}/items/{item_id}",
    params(
        ("category" = String, Path, description = "Category key"),
        ("item_id" = String, Path, description = "Category item ID"),
    ),
    tag = "categories",
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found in this category"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_category_item(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Categories, operation::DeleteAll>,
    Path((category, item_id)): Path<(String, CategoryItemId)>,
) -> Result<StatusCode, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = CategoryItems::new(&mut pool_conn);

    // The item must live in the addressed category
    let item = repo.get_by_id(item_id).await?;
    if !item.is_some_and(|i| i.category == category) {
        return Err(Error::NotFound {
            resource: "Category item".to_string(),
            id: item_id.to_string(),
        });
    }

    repo.delete(item_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_user};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_create_then_public_list(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        for item in ["Electronics", "Apparel"] {
            server
                .post("/admin/api/v1/categories/product_category/items")
                .add_header(name.clone(), value.clone())
                .json(&serde_json::json!({ "name": item }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server.get("/api/v1/categories/product_category/items").await;
        response.assert_status_ok();

        let items: Vec<CategoryItemResponse> = response.json();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Apparel", "Electronics"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_item_conflicts(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        let payload = serde_json::json!({ "name": "Distributor" });

        server
            .post("/admin/api/v1/categories/business_type/items")
            .add_header(name.clone(), value.clone())
            .json(&payload)
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/admin/api/v1/categories/business_type/items")
            .add_header(name, value)
            .json(&payload)
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_item(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        let response = server
            .post("/admin/api/v1/categories/business_type/items")
            .add_header(name.clone(), value.clone())
            .json(&serde_json::json!({ "name": "Retailer" }))
            .await;
        let item: CategoryItemResponse = response.json();

        // Addressing the item under the wrong category is a miss
        server
            .delete(&format!("/admin/api/v1/categories/product_category/items/{}", item.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);

        server
            .delete(&format!("/admin/api/v1/categories/business_type/items/{}", item.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .delete(&format!("/admin/api/v1/categories/business_type/items/{}", item.id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
