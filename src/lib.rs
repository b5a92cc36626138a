//! Bloglist REST service.
//!
//! CRUD on blog posts, like/unlike toggle, comments, user registration
//! and JWT login, backed by MongoDB.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use mongodb::bson::doc;
use mongodb::Client;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{AppState, Config};
use store::Store;

/// Assemble the application router with its middleware layers.
pub fn app(state: AppState) -> Router {
    router::router()
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the service. Fails before accepting any connection when the
/// configuration is incomplete or MongoDB is unreachable.
pub async fn run() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    // A subscriber may already be installed (tests); that's fine.
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = Config::from_env()?;

    let client = Client::with_uri_str(&config.mongodb_uri).await?;
    let db = client
        .default_database()
        .unwrap_or_else(|| client.database("bloglist"));
    // The driver connects lazily; ping so a dead database is a startup
    // failure instead of a failure on the first request.
    db.run_command(doc! { "ping": 1 }).await?;
    info!("connected to MongoDB ({})", db.name());

    let store = Arc::new(Store::new(&db));
    let state = AppState::new(store, &config.secret);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server running on port {}", config.port);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
