//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Login, logout, password setup after approval, password reset
//! - [`suppliers`]: Public registration, the admin review console, and the
//!   supplier's own profile and dashboard
//! - [`payments`]: Checkout sessions, the gateway webhook, and the admin
//!   payments dashboard with CSV export
//! - [`contact_inquiries`]: The public contact form and the admin inbox
//! - [`categories`]: Form dropdown option lists
//! - [`settings`]: Subscription plans and the registration fee
//!
//! # Authentication
//!
//! Admin and supplier endpoints authenticate via the session cookie. The
//! [`crate::auth::permissions::RequiresPermission`] extractor enforces
//! per-resource permissions; public endpoints take no extractor.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to appropriate
//! HTTP status codes and JSON error responses.

pub mod auth;
pub mod categories;
pub mod contact_inquiries;
pub mod payments;
pub mod settings;
pub mod suppliers;
