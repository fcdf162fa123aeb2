pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod pages;
pub mod pagination;
pub mod render;
pub mod users;

use actix_web::{web, HttpResponse};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{ApiClaims, AuthService, SessionUser};
pub use db::{DbOperations, User, UserSession};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// The full route table, shared by `main` and the integration tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        // Pages
        .route("/", web::get().to(pages::index))
        .route("/login/", web::get().to(auth::handlers::login_page))
        .route("/login/", web::post().to(auth::handlers::login))
        .route("/logout/", web::get().to(auth::handlers::logout))
        .route("/register/", web::get().to(users::handlers::register_page))
        .route("/register/", web::post().to(users::handlers::register))
        .route("/users/", web::get().to(users::handlers::get_users))
        // Events
        .route("/create/", web::get().to(events::handlers::create_event_page))
        .route("/create/", web::post().to(events::handlers::create_event))
        .route("/events/", web::get().to(events::handlers::get_events))
        .route("/search/", web::get().to(events::handlers::search_event))
        .route("/events/{id}/", web::get().to(events::handlers::get_event_by_id))
        .route("/events/{id}/update/", web::get().to(events::handlers::update_event_page))
        .route("/events/{id}/update/", web::post().to(events::handlers::update_event))
        .route("/events/{id}/users/", web::get().to(events::handlers::get_users_by_event_id))
        .route("/events/{id}/users", web::post().to(events::handlers::bind_user_by_event_id))
        // JSON API
        .route("/api/login/", web::post().to(auth::handlers::api_login))
        .route("/api/events/", web::get().to(events::api::list_events))
        .route("/api/events/", web::post().to(events::api::create_event))
        .route("/api/events/{id}/", web::patch().to(events::api::update_event))
        .route("/api/events/{id}/", web::delete().to(events::api::delete_event))
        .route("/api/events/{id}/users/", web::get().to(events::api::list_event_registrations))
        .route("/api/users/", web::get().to(users::api::list_users))
        .route("/api/users/", web::post().to(users::api::create_user))
        .route("/api/users/{id}/", web::post().to(users::api::replace_user))
        .route("/api/users/{id}/", web::patch().to(users::api::patch_user))
        .route("/api/users/{id}/", web::delete().to(users::api::delete_user))
        .default_service(web::route().to(pages::not_found));
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db_pool: Arc<PgPool>,
    pub db: DbOperations,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        // Initialize database connection pool
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .map_err(|e| {
                AppError::DatabaseError(error::DatabaseError::ConnectionError(e.to_string()))
            })?;

        Ok(Self::with_pool(config, pool))
    }

    /// Assemble the state around an existing pool. Tests use this with a
    /// lazy pool so no database is needed until a query actually runs.
    pub fn with_pool(config: Settings, pool: PgPool) -> Self {
        let db_pool = Arc::new(pool);
        let db = DbOperations::new(db_pool.clone());
        let auth = Arc::new(AuthService::new(
            db.clone(),
            config.auth.jwt_secret.clone(),
            config.auth.token_expiry_minutes,
            config.auth.session_expiry_hours,
        ));

        Self {
            config: Arc::new(config),
            db_pool,
            db,
            auth,
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        // Close database connections
        self.db_pool.close().await;
        Ok(())
    }
}
