//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each model struct matches a database table schema
//! - **SQLx Integration**: Models derive `sqlx::FromRow` for query results
//! - **Separation**: Database models are distinct from API models to allow
//!   independent evolution of storage and API representations
//!
//! # Model Categories
//!
//! - [`suppliers`]: Supplier records progressing through registration, review,
//!   and payment
//! - [`users`]: Login accounts (admins and supplier accounts)
//! - [`contact_inquiries`]: Public contact-form submissions
//! - [`category_items`]: Admin-configurable dropdown options
//! - [`subscription_plans`]: Plans and the singleton settings row
//! - [`payments`]: Confirmed checkout sessions
//! - [`password_tokens`]: Time-limited password setup/reset tokens
//!
//! # Conversion to API Models
//!
//! Database models typically implement `From` or `Into` conversions to API models:
//!
//! ```ignore
//! use vendorctl::db::models::suppliers::SupplierDBResponse;
//! use vendorctl::api::models::suppliers::SupplierResponse;
//!
//! let db_supplier: SupplierDBResponse = /* ... */;
//! let api_response: SupplierResponse = db_supplier.into();
//! ```

pub mod category_items;
pub mod contact_inquiries;
pub mod password_tokens;
pub mod payments;
pub mod subscription_plans;
pub mod suppliers;
pub mod users;
