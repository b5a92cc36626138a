//! User registration and listing.

use axum::{extract::State, http::StatusCode, Json};
use bcrypt::{hash, DEFAULT_COST};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use tracing::info;

use crate::config::AppState;
use crate::error::{Error, Result};
use crate::models::{User, UserResponse};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 3;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let (username, password) = validate_new_user(&req)?;

    if state
        .store
        .find_user_by_username(username)
        .await?
        .is_some()
    {
        return Err(Error::Validation("username must be unique".to_string()));
    }

    let password_hash =
        hash(password, DEFAULT_COST).map_err(|e| Error::Internal(e.to_string()))?;

    let user = User {
        id: Some(ObjectId::new()),
        username: username.to_string(),
        name: req.name.clone(),
        password_hash,
        blogs: Vec::new(),
    };
    state.store.insert_user(&user).await?;

    info!("user registered: {}", user.username);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Check length constraints before touching the store. The password rule
/// is reported with its own message, distinct from the username one.
fn validate_new_user(req: &CreateUserRequest) -> Result<(&str, &str)> {
    let username = req
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Error::Validation("username is required".to_string()))?;
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(Error::Validation(format!(
            "username must be at least {MIN_USERNAME_LEN} characters long"
        )));
    }

    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            Error::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters long"
            ))
        })?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    Ok((username, password))
}
