//! Credential validation and token issuance.

use axum::{extract::State, Json};
use bcrypt::verify;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth;
use crate::config::AppState;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// POST /api/login
///
/// Unknown username and wrong password collapse into the same 401 so the
/// caller cannot probe which usernames exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = state
        .store
        .find_user_by_username(&req.username)
        .await?
        .ok_or(Error::LoginFail)?;

    let valid = verify(&req.password, &user.password_hash)
        .map_err(|e| Error::Internal(e.to_string()))?;
    if !valid {
        warn!("failed login attempt for {}", req.username);
        return Err(Error::LoginFail);
    }

    let user_id = user.id.ok_or_else(|| {
        Error::Internal("stored user has no id".to_string())
    })?;
    let token = auth::encode_token(user_id, &user.username, &state.enc_key)?;

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        name: user.name,
    }))
}
