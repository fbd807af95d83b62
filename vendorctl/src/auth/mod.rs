//! Authentication and authorization system.
//!
//! This module provides:
//! - Session authentication via secure HTTP-only cookies backed by JWTs
//! - Password hashing and validation (Argon2id)
//! - Role-based permission checking
//! - Password setup/reset token helpers
//!
//! # Authentication
//!
//! Browser-based only: users log in via `/authentication/login` with
//! email/password and receive a signed JWT in an HTTP-only cookie. There is
//! no API-key surface; the service fronts a back-office UI.
//!
//! Supplier accounts are created through the approval flow: an admin approves
//! a supplier, the supplier receives a setup link by email, and
//! `/authentication/setup-password` creates the account.
//!
//! # Authorization
//!
//! Two roles: `admin` (full access to the review console, payments dashboard,
//! and settings) and `supplier` (own profile and dashboard only). See
//! [`permissions`] for the permission matrix and the [`permissions::RequiresPermission`]
//! handler extractor.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`permissions`]: Permission checking and access control logic
//! - [`session`]: JWT session token creation and verification
//! - [`utils`]: Registration helpers (supplier reference generation)

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
pub mod utils;
