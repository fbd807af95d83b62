//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Validation**: Request models validate server-side before any write
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Model Categories
//!
//! ## Resource Models
//!
//! - [`suppliers`]: Registration payloads, admin updates, and review decisions
//! - [`users`]: Account roles and the authenticated-user representation
//! - [`contact_inquiries`]: Contact form payloads
//! - [`categories`]: Form dropdown option records
//! - [`settings`]: Subscription plans and the registration fee
//!
//! ## Payment Models
//!
//! - [`payments`]: Checkout sessions and the payments dashboard
//! - [`subscriptions`]: Derived subscription status buckets
//!
//! ## Authentication Models
//!
//! - [`auth`]: Login, password setup, and password reset payloads

pub mod auth;
pub mod categories;
pub mod contact_inquiries;
pub mod pagination;
pub mod payments;
pub mod settings;
pub mod subscriptions;
pub mod suppliers;
pub mod users;
