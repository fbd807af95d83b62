//! OpenAPI documentation for the back-office API.
//!
//! Served at `/docs` via Scalar. Public marketing-site endpoints, the
//! authentication flows, and the admin console all live in one spec; the
//! session-cookie security scheme marks which operations need a login.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Registers the session-cookie security scheme.
struct SessionSecurityAddon;

impl Modify for SessionSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_token".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "session",
                    "Session cookie issued by /authentication/login or /authentication/setup-password.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "vendorctl",
        description = "Supplier onboarding back office: registration, admin review, \
                       payment-gated subscriptions, and the payments dashboard."
    ),
    paths(
        // Authentication
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        api::handlers::auth::setup_password,
        api::handlers::auth::request_password_reset,
        api::handlers::auth::confirm_password_reset,
        api::handlers::auth::change_password,
        // Suppliers
        api::handlers::suppliers::register,
        api::handlers::suppliers::list_suppliers,
        api::handlers::suppliers::get_supplier,
        api::handlers::suppliers::update_supplier,
        api::handlers::suppliers::delete_supplier,
        api::handlers::suppliers::approve_supplier,
        api::handlers::suppliers::reject_supplier,
        api::handlers::suppliers::get_own_profile,
        api::handlers::suppliers::update_own_profile,
        api::handlers::suppliers::get_own_dashboard,
        // Payments
        api::handlers::payments::create_checkout_session,
        api::handlers::payments::payment_webhook,
        api::handlers::payments::payments_dashboard,
        api::handlers::payments::export_payments_csv,
        // Contact
        api::handlers::contact_inquiries::create_inquiry,
        api::handlers::contact_inquiries::list_inquiries,
        // Categories
        api::handlers::categories::list_category_items,
        api::handlers::categories::create_category_item,
        api::handlers::categories::delete_category_item,
        // Plans and settings
        api::handlers::settings::list_public_plans,
        api::handlers::settings::list_plans,
        api::handlers::settings::create_plan,
        api::handlers::settings::update_plan,
        api::handlers::settings::delete_plan,
        api::handlers::settings::get_settings,
        api::handlers::settings::update_settings,
    ),
    components(schemas(
        api::models::auth::LoginRequest,
        api::models::auth::SetupPasswordRequest,
        api::models::auth::RequestResetRequest,
        api::models::auth::ConfirmResetRequest,
        api::models::auth::ChangePasswordRequest,
        api::models::auth::AuthResponse,
        api::models::auth::AuthSuccessResponse,
        api::models::users::CurrentUser,
        api::models::users::UserResponse,
        api::models::users::Role,
        api::models::suppliers::SupplierRegistration,
        api::models::suppliers::SupplierAdminUpdate,
        api::models::suppliers::SupplierProfileUpdate,
        api::models::suppliers::SupplierResponse,
        api::models::suppliers::SupplierStatus,
        api::models::suppliers::PaymentStatus,
        api::models::suppliers::RegistrationResponse,
        api::models::suppliers::ReviewDecisionResponse,
        api::models::suppliers::RejectRequest,
        api::handlers::suppliers::SupplierDashboard,
        api::models::subscriptions::SubscriptionBucket,
        api::models::payments::CheckoutRequest,
        api::models::payments::CheckoutResponse,
        api::models::payments::PaymentResponse,
        api::models::payments::DashboardRow,
        api::models::payments::DashboardSummary,
        api::models::payments::DashboardResponse,
        api::models::contact_inquiries::ContactInquiryCreate,
        api::models::contact_inquiries::ContactInquiryResponse,
        api::models::categories::CategoryItemCreate,
        api::models::categories::CategoryItemResponse,
        api::models::settings::PlanCreate,
        api::models::settings::PlanUpdate,
        api::models::settings::PlanResponse,
        api::models::settings::PublicPlansResponse,
        api::models::settings::SubscriptionSettingsResponse,
        api::models::settings::SubscriptionSettingsUpdate,
    )),
    modifiers(&SessionSecurityAddon),
    tags(
        (name = "authentication", description = "Login, password setup, and password reset"),
        (name = "suppliers", description = "Registration, review console, supplier profile and dashboard"),
        (name = "payments", description = "Checkout, payment webhook, and the payments dashboard"),
        (name = "contact", description = "Contact inquiries"),
        (name = "categories", description = "Form dropdown option lists"),
        (name = "settings", description = "Subscription plans and settings"),
    )
)]
pub struct ApiDoc;
