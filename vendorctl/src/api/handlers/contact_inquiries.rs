//! Contact inquiry handlers: the public contact form and the admin inbox.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        contact_inquiries::{ContactInquiryCreate, ContactInquiryResponse},
        pagination::{PaginatedResponse, Pagination},
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        handlers::{ContactInquiries, InquiryFilter, Repository},
        models::contact_inquiries::ContactInquiryCreateDBRequest,
    },
    errors::Error,
};

/// Submit a contact inquiry
#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = ContactInquiryCreate,
    tag = "contact",
    responses(
        (status = 201, description = "Inquiry received", body = ContactInquiryResponse),
        (status = 422, description = "Invalid payload"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_inquiry(
    State(state): State<AppState>,
    Json(inquiry): Json<ContactInquiryCreate>,
) -> Result<(StatusCode, Json<ContactInquiryResponse>), Error> {
    inquiry.validate()?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let created = ContactInquiries::new(&mut pool_conn)
        .create(&ContactInquiryCreateDBRequest {
            name: inquiry.name,
            company: inquiry.company,
            email: inquiry.email,
            message: inquiry.message,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ContactInquiryResponse::from(created))))
}

/// List contact inquiries, newest first (admin)
#[utoipa::path(
    get,
    path = "/admin/api/v1/contact-inquiries",
    params(Pagination),
    tag = "contact",
    responses(
        (status = 200, description = "Inquiries", body = PaginatedResponse<ContactInquiryResponse>),
        (status = 403, description = "Not permitted"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_inquiries(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::ContactInquiries, operation::ReadAll>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<PaginatedResponse<ContactInquiryResponse>>, Error> {
    let (skip, limit) = pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = ContactInquiries::new(&mut pool_conn);

    let total_count = repo.count().await?;
    let inquiries = repo.list(&InquiryFilter { skip, limit }).await?;

    Ok(Json(PaginatedResponse::new(
        inquiries.into_iter().map(ContactInquiryResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_user};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_contact_form_roundtrip(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;

        let response = server
            .post("/api/v1/contact")
            .json(&serde_json::json!({
                "name": "Sam Lee",
                "company": "Lee Imports",
                "email": "sam@example.com",
                "message": "Interested in listing our products",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let admin = create_test_user(&pool, "admin@example.com", "adminpassword", Role::Admin).await;
        let (name, value) = add_auth_headers(&admin, &state.config);

        let response = server.get("/admin/api/v1/contact-inquiries").add_header(name, value).await;
        response.assert_status_ok();

        let body: PaginatedResponse<ContactInquiryResponse> = response.json();
        assert_eq!(body.total_count, 1);
        assert_eq!(body.data[0].email, "sam@example.com");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_contact_form_rejects_empty_message(pool: PgPool) {
        let (server, _state) = create_test_app(pool.clone()).await;

        let response = server
            .post("/api/v1/contact")
            .json(&serde_json::json!({
                "name": "Sam Lee",
                "email": "sam@example.com",
                "message": "   ",
            }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_inbox_requires_admin(pool: PgPool) {
        let (server, _state) = create_test_app(pool.clone()).await;
        server.get("/admin/api/v1/contact-inquiries").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
