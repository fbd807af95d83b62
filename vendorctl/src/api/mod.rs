//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! The API is divided into several functional areas:
//!
//! - **Authentication** (`/authentication/*`): Login, password setup and reset
//! - **Suppliers** (`/api/v1/suppliers/*`): Public registration, own profile and dashboard
//! - **Payments** (`/api/v1/payments/*`, `/webhooks/payments`): Checkout and payment confirmation
//! - **Contact** (`/api/v1/contact`): Public contact inquiries
//! - **Categories** (`/api/v1/categories/*`): Dropdown reference data for registration forms
//! - **Admin console** (`/admin/api/v1/*`): Supplier review, payments dashboard, CSV export,
//!   inquiries, categories, and subscription settings
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
