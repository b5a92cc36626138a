//! Route table.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::config::AppState;
use crate::handlers::{blogs, health_check, login, users};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/blogs", get(blogs::list).post(blogs::create))
        .route("/api/blogs/{id}", put(blogs::update).delete(blogs::remove))
        .route("/api/blogs/{id}/like", put(blogs::toggle_like))
        .route("/api/blogs/{id}/comments", post(blogs::add_comment))
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/login", post(login::login))
        .route("/health", get(health_check))
}
