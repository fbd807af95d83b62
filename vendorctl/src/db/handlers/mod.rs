//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Suppliers`]: Supplier lifecycle (registration, review, payment state)
//! - [`Users`]: Login accounts
//! - [`Payments`]: Confirmed checkout sessions
//! - [`ContactInquiries`]: Public contact-form submissions
//! - [`CategoryItems`]: Form dropdown options
//! - [`SubscriptionPlans`]: Plans plus the singleton settings row
//! - [`PasswordTokens`]: Password setup/reset token lifecycle
//!
//! # Common Pattern
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use vendorctl::db::handlers::{Suppliers, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Suppliers::new(&mut tx);
//!     let supplier = repo.get_by_id(id).await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod category_items;
pub mod contact_inquiries;
pub mod password_tokens;
pub mod payments;
pub mod repository;
pub mod subscription_plans;
pub mod suppliers;
pub mod users;

pub use category_items::{CategoryItemFilter, CategoryItems};
pub use contact_inquiries::{ContactInquiries, InquiryFilter};
pub use password_tokens::PasswordTokens;
pub use payments::{PaymentFilter, Payments};
pub use repository::Repository;
pub use subscription_plans::{PlanFilter, SubscriptionPlans};
pub use suppliers::{DashboardFilter, SupplierFilter, Suppliers};
pub use users::{UserFilter, Users};
