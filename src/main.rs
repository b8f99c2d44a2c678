//! Educational Content Admin Backend
//!
//! REST backend for the admin dashboard: courses, lectures, jobs, ebooks,
//! users, subscriptions and categories, kept in an in-memory store that is
//! persisted to SQLite-backed local storage.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod store;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::LocalStorage;
use models::{Category, Course, Ebook, Job, Lecture, Subscription, User};
use store::Store;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting educational content admin backend");
    tracing::info!("Local storage path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (EDU_ADMIN_API_PSK). Authentication is disabled!");
    }

    // Initialize local storage and load the store
    let pool = db::init_database(&config.db_path).await?;
    let store = Arc::new(Store::open(LocalStorage::new(pool)).await?);

    // Create application state
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Datastore
        .route(
            "/datastore",
            get(api::get_datastore).put(api::import_datastore),
        )
        .route("/datastore/revision", get(api::get_revision))
        // Collections
        .merge(api::collection_routes::<Category>())
        .merge(api::collection_routes::<Course>())
        .merge(api::collection_routes::<Lecture>())
        .merge(api::collection_routes::<Job>())
        .merge(api::collection_routes::<Ebook>())
        .merge(api::collection_routes::<User>())
        .merge(api::collection_routes::<Subscription>())
        // Views
        .route("/courses/{id}/summary", get(api::course_summary))
        .route(
            "/subscriptions/{id}/contents",
            get(api::subscription_contents),
        )
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
