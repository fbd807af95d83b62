//! Shared helpers for integration tests.
//!
//! Each test gets its own database via `#[sqlx::test]`; these helpers build an
//! in-process [`TestServer`] against that pool and seed the rows a test needs.

use std::{sync::Arc, time::Duration};

use axum_test::TestServer;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role, UserResponse},
    auth::{password, session, utils::generate_supplier_reference},
    config::{AuthConfig, Config, CorsConfig, DatabaseConfig, EmailConfig, EmailTransportConfig, PaymentConfig},
    db::{
        handlers::{Repository, SubscriptionPlans, Suppliers, Users},
        models::{
            subscription_plans::{PlanCreateDBRequest, PlanDBResponse},
            suppliers::{SupplierCreateDBRequest, SupplierDBResponse},
            users::UserCreateDBRequest,
        },
    },
    email::EmailService,
    payment_providers,
};

/// Build a test server backed by the given pool, with the dummy payment
/// provider and file-transport email.
pub async fn create_test_app(pool: PgPool) -> (TestServer, AppState) {
    create_test_app_with_config(pool, create_test_config()).await
}

/// Like [`create_test_app`] but with a caller-supplied config, for tests that
/// need to tweak a setting (e.g. a deliberately broken email transport).
pub async fn create_test_app_with_config(pool: PgPool, config: Config) -> (TestServer, AppState) {
    let email = EmailService::new(&config).expect("Failed to create email service");
    let payment_provider: Arc<dyn payment_providers::PaymentProvider> =
        Arc::from(payment_providers::create_provider(PaymentConfig::Dummy));

    let state = AppState::builder()
        .db(pool)
        .config(config)
        .email(Arc::new(email))
        .payment_provider(payment_provider)
        .build();

    let router = crate::build_router(&state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, state)
}

/// Build just the [`AppState`] for tests that exercise extractors directly
/// rather than going through a [`TestServer`].
pub async fn create_test_app_state(pool: PgPool, config: Config) -> AppState {
    let (_server, state) = create_test_app_with_config(pool, config).await;
    state
}

pub fn create_test_config() -> Config {
    // Emails land in a temp directory so tests never touch SMTP
    let email_dir = std::env::temp_dir().join(format!("vendorctl-test-emails-{}", std::process::id()));

    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        dashboard_url: "http://localhost:5173".to_string(),
        database_url: None,
        database: DatabaseConfig {
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        },
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        auth: AuthConfig {
            secret_key: "test-secret-key-for-testing-only".to_string(),
            jwt_expiry: Duration::from_secs(30 * 60),
            cookie_secure: false,
            // Cheap hashing parameters, tests hash on every login
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..Default::default()
        },
        cors: CorsConfig::default(),
        payment: Some(PaymentConfig::Dummy),
        email: EmailConfig {
            transport: EmailTransportConfig::File {
                path: email_dir.to_string_lossy().to_string(),
            },
            ..Default::default()
        },
        seed_defaults: false,
        enable_otel_export: false,
    }
}

/// Session cookie header for the given user, as a (name, value) pair for
/// `TestServer::add_header`.
pub fn add_auth_headers(user: &UserResponse, config: &Config) -> (String, String) {
    let current_user = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        supplier_id: user.supplier_id,
    };
    let token = session::create_session_token(&current_user, config).expect("Failed to create session token");

    ("cookie".to_string(), format!("{}={}", config.auth.session_cookie_name, token))
}

pub async fn create_test_user(pool: &PgPool, email: &str, password: &str, role: Role) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);

    let password_hash = password::hash_string(password).expect("Failed to hash password");
    let user = users
        .create(&UserCreateDBRequest {
            username: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password_hash,
            role,
            supplier_id: None,
        })
        .await
        .expect("Failed to create test user");

    user.into()
}

/// Register a supplier directly in the database, status left at the
/// registration default (pending approval).
pub async fn create_test_supplier(pool: &PgPool, email: &str) -> SupplierDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut suppliers = Suppliers::new(&mut conn);

    suppliers
        .create(&SupplierCreateDBRequest {
            reference: generate_supplier_reference(),
            company_name: format!("{} Trading LLC", email.split('@').next().unwrap_or("Test")),
            contact_name: "Test Contact".to_string(),
            email: email.to_string(),
            phone: "+971-50-0000000".to_string(),
            country: "United Arab Emirates".to_string(),
            city: Some("Dubai".to_string()),
            business_type: "Distributor".to_string(),
            website: None,
            description: None,
            categories: vec!["Electronics".to_string()],
            terms_accepted: true,
            privacy_accepted: true,
        })
        .await
        .expect("Failed to create test supplier")
}

/// Create the login account linked to a supplier record.
pub async fn create_test_supplier_user(pool: &PgPool, supplier: &SupplierDBResponse, password: &str) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);

    let password_hash = password::hash_string(password).expect("Failed to hash password");
    let user = users
        .create(&UserCreateDBRequest {
            username: supplier.contact_name.clone(),
            email: supplier.email.clone(),
            password_hash,
            role: Role::Supplier,
            supplier_id: Some(supplier.id),
        })
        .await
        .expect("Failed to create test supplier user");

    user.into()
}

pub async fn create_test_plan(pool: &PgPool, label: &str, duration_years: i32, price: Decimal) -> PlanDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut plans = SubscriptionPlans::new(&mut conn);

    plans
        .create(&PlanCreateDBRequest {
            label: label.to_string(),
            duration_years,
            price,
            active: true,
        })
        .await
        .expect("Failed to create test plan")
}
