//! Engagement Backend
//!
//! Points, rewards and suggestion-box ledger for the plant kiosk, served as a
//! REST API over SQLite.

mod api;
mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod ledger;
mod models;
mod summary;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog::RewardCatalog;
use config::Config;
use db::Repository;
use ledger::Ledger;
use summary::Summarizer;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub catalog: Arc<RewardCatalog>,
    pub summarizer: Arc<Summarizer>,
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

    tracing::info!("Starting Engagement Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (ENGAGE_API_PSK). Authentication is disabled!");
    }
    if config.gemini_api_key.is_none() {
        tracing::warn!("No summarization key configured (ENGAGE_GEMINI_API_KEY). Summaries use fallback text");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    if config.seed_demo_data && db::seed_demo_data(&pool).await? {
        tracing::info!("Seeded demo data into empty database");
    }
    let ledger = Arc::new(Ledger::new(Repository::new(pool)));

    // Load reward catalog
    let catalog = RewardCatalog::load(config.catalog_path.as_deref())?;
    tracing::info!("Reward catalog loaded with {} rewards", catalog.rewards().len());

    // Create application state
    let state = AppState {
        ledger,
        catalog: Arc::new(catalog),
        summarizer: Arc::new(Summarizer::from_config(&config)),
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
        // Session
        .route("/login", post(api::login))
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        .route("/analytics", get(api::get_analytics))
        // Employees
        .route("/employees", get(api::list_employees))
        .route("/employees/{id}", get(api::get_employee))
        .route("/employees/{id}/redemptions", get(api::list_employee_redemptions))
        .route("/employees/{id}/rewards", get(api::list_employee_rewards))
        .route("/employees/{id}/feed", get(api::get_feed))
        .route("/leaderboard", get(api::get_leaderboard))
        // News
        .route("/news", get(api::list_news).post(api::create_article))
        .route("/news/{id}/votes", post(api::vote_article))
        .route("/news/{id}/summary", post(api::summarize_article))
        // Suggestions
        .route(
            "/suggestions",
            get(api::list_suggestions).post(api::submit_suggestion),
        )
        .route("/suggestions/{id}", delete(api::delete_suggestion))
        .route("/suggestions/{id}/status", put(api::update_suggestion_status))
        // Rewards
        .route("/rewards", get(api::list_rewards))
        .route(
            "/redemptions",
            get(api::list_redemptions).post(api::redeem_reward),
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
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
