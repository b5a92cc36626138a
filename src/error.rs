use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum Error {
    // Auth
    LoginFail,
    TokenMissingOrInvalid,

    // Request
    Validation(String),
    NotFound,

    // Infrastructure
    Database(mongodb::error::Error),
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // 404s go out with an empty body; everything else carries
        // a flat {"error": "..."} payload.
        let (status, message) = match self {
            Error::LoginFail => (
                StatusCode::UNAUTHORIZED,
                "invalid username or password".to_string(),
            ),
            Error::TokenMissingOrInvalid => (
                StatusCode::UNAUTHORIZED,
                "token missing or invalid".to_string(),
            ),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound => return StatusCode::NOT_FOUND.into_response(),
            Error::Database(err) => {
                error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "something went wrong".to_string(),
                )
            }
            Error::Internal(msg) => {
                error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "something went wrong".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        Error::Database(err)
    }
}

impl From<mongodb::bson::ser::Error> for Error {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
