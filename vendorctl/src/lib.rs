//! # vendorctl: Supplier Onboarding Back Office
//!
//! `vendorctl` is the back-office service behind a supplier marketing site.
//! It owns the supplier lifecycle end to end: public registration, admin
//! review with email notifications, password setup for approved suppliers,
//! payment-gated subscriptions, and an admin payments dashboard with CSV
//! export.
//!
//! ## Overview
//!
//! Suppliers apply through the marketing site's registration form. Each
//! application lands in a review queue where an admin approves or rejects it;
//! either way the applicant is notified by email. Approval emails carry a
//! single-use password-setup link, and once a supplier has credentials they
//! are routed to a payment page. Payment is confirmed server-side via a
//! signed gateway webhook, which stamps the subscription window onto the
//! supplier record and unlocks their dashboard.
//!
//! ### Request Flow
//!
//! Public endpoints (`/api/v1/*` registration, contact form, category lists,
//! plan listing) take no authentication. Everything else authenticates via a
//! JWT session cookie: supplier-facing endpoints under `/api/v1/*` and the
//! admin console under `/admin/api/v1/*`, with per-resource permissions
//! enforced by the [`auth::permissions::RequiresPermission`] extractor.
//! Payment gateway callbacks arrive at `/webhooks/payments` and are verified
//! by signature, not by session.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) contains the Axum handlers and the
//! request/response models, annotated for OpenAPI docs served at `/docs`.
//!
//! The **authentication layer** ([`auth`]) issues and verifies session JWTs,
//! hashes passwords with Argon2id, and manages single-use setup/reset tokens.
//!
//! The **database layer** ([`db`]) uses the repository pattern over SQLx and
//! PostgreSQL; migrations run automatically at startup.
//!
//! **Payment providers** (`payment_providers`) abstract the checkout gateway
//! behind a trait, with a Stripe implementation and a dummy provider for
//! tests and local development.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use vendorctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = vendorctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     vendorctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
mod email;
pub mod errors;
mod openapi;
pub mod payment_providers;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::HeaderValue,
    routing::{delete, get, patch, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    api::models::users::Role,
    auth::password,
    config::CorsOrigin,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    email::EmailService,
    openapi::ApiDoc,
    payment_providers::PaymentProvider,
};

pub use types::{InquiryId, PaymentId, PlanId, SupplierId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from file/environment
/// - `email`: Email service for approval, rejection, payment, and reset mail
/// - `payment_provider`: The configured checkout gateway
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub email: Arc<EmailService>,
    pub payment_provider: Arc<dyn PaymentProvider>,
}

/// Get the vendorctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the admin account on first startup, and updates the
/// password on later startups if one is configured. Returns the user id.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> Result<UserId, anyhow::Error> {
    let password_hash = match password {
        Some(pwd) => password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?,
        // Unreachable via login until a password is set
        None => password::hash_string(&password::generate_token()).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        if password.is_some() {
            sqlx::query!("UPDATE users SET password_hash = $1 WHERE email = $2", password_hash, email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            username: email.to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::Admin,
            supplier_id: None,
        })
        .await?;

    tx.commit().await?;
    info!("Created initial admin user {}", email);
    Ok(created_user.id)
}

/// Form dropdown defaults seeded on first startup.
const SEED_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "business_types",
        &["Manufacturer", "Distributor", "Wholesaler", "Retailer", "Service Provider"],
    ),
    (
        "supply_categories",
        &[
            "Electronics",
            "Apparel & Textiles",
            "Food & Beverage",
            "Construction Materials",
            "Industrial Equipment",
            "Office Supplies",
        ],
    ),
    (
        "countries",
        &["United Arab Emirates", "Saudi Arabia", "Qatar", "Kuwait", "Bahrain", "Oman"],
    ),
    (
        "emirates",
        &["Abu Dhabi", "Dubai", "Sharjah", "Ajman", "Umm Al Quwain", "Ras Al Khaimah", "Fujairah"],
    ),
];

/// Subscription plan defaults: (label, duration in years, price).
const SEED_PLANS: &[(&str, i32, &str)] = &[("1 Year", 1, "499.00"), ("2 Years", 2, "899.00"), ("3 Years", 3, "1199.00")];

/// Seed the database with default category items and subscription plans.
///
/// Idempotent: a `defaults_seeded` marker in `system_config` ensures this
/// runs once, so admin edits to the seeded lists survive restarts.
#[instrument(skip_all)]
pub async fn seed_database(db: &PgPool) -> Result<(), anyhow::Error> {
    let mut tx = db.begin().await?;

    let seeded = sqlx::query_scalar!("SELECT value FROM system_config WHERE key = 'defaults_seeded'")
        .fetch_optional(&mut *tx)
        .await?;

    if seeded.is_some() {
        debug!("Database already seeded, skipping");
        tx.commit().await?;
        return Ok(());
    }

    info!("Seeding database with default categories and plans");

    for (category, names) in SEED_CATEGORIES {
        for name in *names {
            sqlx::query!(
                "INSERT INTO category_items (id, category, name)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (category, name) DO NOTHING",
                uuid::Uuid::new_v4(),
                category,
                name,
            )
            .execute(&mut *tx)
            .await?;
        }
    }

    for (label, duration_years, price) in SEED_PLANS {
        let price: rust_decimal::Decimal = price.parse().map_err(|e| anyhow::anyhow!("Invalid seed plan price: {e}"))?;
        sqlx::query!(
            "INSERT INTO subscription_plans (id, label, duration_years, price, active)
             VALUES ($1, $2, $3, $4, TRUE)
             ON CONFLICT (label) DO NOTHING",
            uuid::Uuid::new_v4(),
            label,
            duration_years,
            price,
        )
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query!("INSERT INTO system_config (key, value) VALUES ('defaults_seeded', 'true') ON CONFLICT (key) DO NOTHING")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    debug!("Database seeded successfully");
    Ok(())
}

/// Connect to the database, run migrations, and bootstrap startup data
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;

    create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

    if config.seed_defaults {
        seed_database(&pool).await?;
    }

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut exposed = Vec::new();
    for header in &config.cors.exposed_headers {
        exposed.push(header.parse::<axum::http::HeaderName>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
        .expose_headers(exposed);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Readiness probe: a database round-trip
async fn ready(State(state): State<AppState>) -> Result<&'static str, errors::Error> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| errors::Error::Database(e.into()))?;
    Ok("OK")
}

/// Build the main application router with all endpoints and middleware.
///
/// Route groups:
/// - `/api/v1/*`: public marketing-site endpoints plus the supplier's own
///   profile and dashboard
/// - `/admin/api/v1/*`: the admin console
/// - `/authentication/*`: login, password setup, password reset
/// - `/webhooks/payments`: signed gateway callbacks
/// - `/health`, `/ready`: probes
/// - `/docs`: OpenAPI reference
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/me", get(api::handlers::auth::me))
        .route("/authentication/setup-password", post(api::handlers::auth::setup_password))
        .route("/authentication/request-password-reset", post(api::handlers::auth::request_password_reset))
        .route("/authentication/confirm-password-reset", post(api::handlers::auth::confirm_password_reset))
        .route("/authentication/change-password", post(api::handlers::auth::change_password));

    // Public site endpoints plus the supplier's own surface
    let public_routes = Router::new()
        .route("/suppliers/register", post(api::handlers::suppliers::register))
        .route("/suppliers/me", get(api::handlers::suppliers::get_own_profile))
        .route("/suppliers/me", patch(api::handlers::suppliers::update_own_profile))
        .route("/dashboard", get(api::handlers::suppliers::get_own_dashboard))
        .route("/payments/checkout-session", post(api::handlers::payments::create_checkout_session))
        .route("/contact", post(api::handlers::contact_inquiries::create_inquiry))
        .route("/categories/{category}/items", get(api::handlers::categories::list_category_items))
        .route("/subscription-plans", get(api::handlers::settings::list_public_plans));

    let admin_routes = Router::new()
        .route("/suppliers", get(api::handlers::suppliers::list_suppliers))
        .route("/suppliers/{supplier_id}", get(api::handlers::suppliers::get_supplier))
        .route("/suppliers/{supplier_id}", patch(api::handlers::suppliers::update_supplier))
        .route("/suppliers/{supplier_id}", delete(api::handlers::suppliers::delete_supplier))
        .route("/suppliers/{supplier_id}/approve", post(api::handlers::suppliers::approve_supplier))
        .route("/suppliers/{supplier_id}/reject", post(api::handlers::suppliers::reject_supplier))
        .route("/payments/dashboard", get(api::handlers::payments::payments_dashboard))
        .route("/payments/export.csv", get(api::handlers::payments::export_payments_csv))
        .route("/contact-inquiries", get(api::handlers::contact_inquiries::list_inquiries))
        .route("/categories/{category}/items", post(api::handlers::categories::create_category_item))
        .route(
            "/categories/{category}/items/{item_id}",
            delete(api::handlers::categories::delete_category_item),
        )
        .route("/subscription-plans", get(api::handlers::settings::list_plans))
        .route("/subscription-plans", post(api::handlers::settings::create_plan))
        .route("/subscription-plans/{plan_id}", patch(api::handlers::settings::update_plan))
        .route("/subscription-plans/{plan_id}", delete(api::handlers::settings::delete_plan))
        .route("/subscription-settings", get(api::handlers::settings::get_settings))
        .route("/subscription-settings", put(api::handlers::settings::update_settings));

    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/ready", get(ready))
        .route("/webhooks/payments", post(api::handlers::payments::payment_webhook))
        .merge(auth_routes)
        .nest("/api/v1", public_routes)
        .nest("/admin/api/v1", admin_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state.clone());

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled application: router, state, and the resources they share.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting vendorctl with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;

        let email = Arc::new(EmailService::new(&config).map_err(|e| anyhow::anyhow!("Failed to initialize email service: {e}"))?);

        let payment_config = config.payment.clone().unwrap_or(config::PaymentConfig::Dummy);
        let payment_provider: Arc<dyn PaymentProvider> = Arc::from(payment_providers::create_provider(payment_config));

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .email(email)
            .payment_provider(payment_provider)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("vendorctl listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
