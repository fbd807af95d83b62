//! Permission checking and access control.
//!
//! Authorization is role-based: admins can do everything, supplier accounts
//! are limited to `*Own` operations on their own supplier record and
//! payments. "Own" scoping itself (which supplier record the caller may
//! touch) is enforced at the handler level via the session's `supplier_id`;
//! this module decides whether the operation class is allowed at all.
//!
//! # Usage in Handlers
//!
//! [`RequiresPermission`] is an extractor: declaring it as a handler argument
//! authenticates the caller and rejects the request with 403 before the
//! handler body runs.
//!
//! ```ignore
//! use vendorctl::auth::permissions::{RequiresPermission, operation, resource};
//!
//! async fn list_suppliers(
//!     _: RequiresPermission<resource::Suppliers, operation::ReadAll>,
//! ) -> &'static str {
//!     "only admins get here"
//! }
//! ```

use std::marker::PhantomData;
use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    errors::Error,
    types::{Operation, Resource},
};

/// Marker types for resources, used as type parameters to [`RequiresPermission`]
pub mod resource {
    use crate::types::Resource;

    pub trait ResourceMarker: Send + Sync {
        const RESOURCE: Resource;
    }

    macro_rules! resource_marker {
        ($name:ident) => {
            pub struct $name;
            impl ResourceMarker for $name {
                const RESOURCE: Resource = Resource::$name;
            }
        };
    }

    resource_marker!(Suppliers);
    resource_marker!(Users);
    resource_marker!(Payments);
    resource_marker!(ContactInquiries);
    resource_marker!(Categories);
    resource_marker!(SubscriptionSettings);
}

/// Marker types for operations, used as type parameters to [`RequiresPermission`]
pub mod operation {
    use crate::types::Operation;

    pub trait OperationMarker: Send + Sync {
        const OPERATION: Operation;
    }

    macro_rules! operation_marker {
        ($name:ident) => {
            pub struct $name;
            impl OperationMarker for $name {
                const OPERATION: Operation = Operation::$name;
            }
        };
    }

    operation_marker!(CreateAll);
    operation_marker!(ReadAll);
    operation_marker!(ReadOwn);
    operation_marker!(UpdateAll);
    operation_marker!(UpdateOwn);
    operation_marker!(DeleteAll);
}

/// Whether a role may perform an operation class on a resource
pub fn has_permission(role: Role, resource: Resource, operation: Operation) -> bool {
    match role {
        Role::Admin => true,
        Role::Supplier => matches!(
            (resource, operation),
            (Resource::Suppliers, Operation::ReadOwn)
                | (Resource::Suppliers, Operation::UpdateOwn)
                | (Resource::Payments, Operation::ReadOwn)
        ),
    }
}

/// Extractor that authenticates the caller and checks a single permission
pub struct RequiresPermission<R, O> {
    user: CurrentUser,
    _marker: PhantomData<(R, O)>,
}

impl<R, O> Deref for RequiresPermission<R, O> {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<R, O> RequiresPermission<R, O> {
    pub fn into_inner(self) -> CurrentUser {
        self.user
    }
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: resource::ResourceMarker,
    O: operation::OperationMarker,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !has_permission(user.role, R::RESOURCE, O::OPERATION) {
            return Err(Error::InsufficientPermissions {
                action: O::OPERATION,
                resource: format!("{:?}", R::RESOURCE),
            });
        }

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}
