//! Warung ordering backend
//!
//! REST backend for a small restaurant: menu, cart and checkout for customers, menu
//! management and the order queue for the admin. Data lives in a hosted database when
//! one is configured and reachable, mirrored into a local SQLite file that also serves
//! as the fallback when it is not.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod remote;
mod session;
mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::LocalStore;
use models::ConnectionStatus;
use remote::{RemoteClient, Subscription};
use session::Session;
use store::Store;

/// Largest accepted image upload.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub session: Arc<Session>,
    pub config: Arc<Config>,
    pub connection: Arc<RwLock<ConnectionStatus>>,
}

impl AppState {
    /// Open the session and data-access layer over one local database.
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let local = LocalStore::new(pool);
        let remote = config.remote().map(RemoteClient::new);

        Self {
            store: Arc::new(Store::new(local.clone(), remote)),
            session: Arc::new(Session::new(local)),
            config: Arc::new(config),
            connection: Arc::new(RwLock::new(ConnectionStatus::Unknown)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Warung ordering backend");
    tracing::info!("Local storage path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if let Some(remote) = config.remote() {
        tracing::info!("Remote service: {}", remote.url);
    }
    if config.admin_password.is_none() {
        tracing::warn!("No admin password configured (WARUNG_ADMIN_PASSWORD). Admin login is disabled!");
    }

    // Initialize local storage
    let pool = db::init_database(&config.db_path).await?;
    let state = AppState::new(config.clone(), pool);
    if !state.store.is_remote_configured() {
        tracing::warn!(
            "Remote service not configured (WARUNG_REMOTE_URL / WARUNG_REMOTE_KEY). Running offline on local storage"
        );
    }

    // Initial connection check for the banner
    {
        let store = Arc::clone(&state.store);
        let connection = Arc::clone(&state.connection);
        tokio::spawn(async move {
            let status = store.check_connection().await;
            tracing::info!("Remote connection: {:?}", status);
            *connection.write().await = status;
        });
    }

    // Keep the local mirror fresh when other sessions change the remote tables
    let subscriptions = refresh_on_remote_changes(&state.store);
    if subscriptions.iter().all(Subscription::is_active) {
        tracing::info!("Live updates enabled for menu and orders");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for subscription in subscriptions {
        subscription.unsubscribe();
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Re-list a table whenever the change feed reports an event on it.
fn refresh_on_remote_changes(store: &Arc<Store>) -> Vec<Subscription> {
    let menu_store = Arc::clone(store);
    let menu = store.subscribe_to_menu_items(move |event| {
        tracing::debug!("{:?} on {}: {}", event.kind, event.table, event.payload);
        let store = Arc::clone(&menu_store);
        tokio::spawn(async move {
            if let Err(e) = store.list_menu_items().await {
                tracing::warn!("Failed to refresh menu after change: {}", e);
            }
        });
    });

    let order_store = Arc::clone(store);
    let orders = store.subscribe_to_orders(move |event| {
        tracing::debug!("{:?} on {}: {}", event.kind, event.table, event.payload);
        let store = Arc::clone(&order_store);
        tokio::spawn(async move {
            if let Err(e) = store.list_orders().await {
                tracing::warn!("Failed to refresh orders after change: {}", e);
            }
        });
    });

    vec![menu, orders]
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Admin routes, behind the session guard
    let admin_routes = Router::new()
        .route("/menu", post(api::create_menu_item))
        .route("/menu/{id}", put(api::update_menu_item))
        .route("/menu/{id}", delete(api::delete_menu_item))
        .route("/orders", get(api::list_orders))
        .route("/orders/pending", get(api::list_pending_orders))
        .route("/orders/{id}", delete(api::complete_order))
        .route(
            "/images",
            post(api::upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_session_layer,
        ));

    // API routes
    let api_routes = Router::new()
        // Menu
        .route("/menu", get(api::list_menu))
        // Cart
        .route("/cart", get(api::get_cart))
        .route("/cart", delete(api::clear_cart))
        .route("/cart/items/{id}", post(api::add_to_cart))
        .route("/cart/items/{id}", delete(api::remove_from_cart))
        // Checkout
        .route("/checkout", post(api::checkout))
        // Connection banner
        .route("/connection", get(api::connection_status))
        .route("/connection/check", post(api::check_connection))
        // Admin session
        .route("/session", get(api::session_info))
        .route("/session/login", post(api::login))
        .route("/session/logout", post(api::logout))
        .nest("/admin", admin_routes);

    // Health check
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
mod mock_remote;
