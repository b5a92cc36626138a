//! Bearer-token authentication.
//!
//! Tokens are HS256-signed JWTs carrying the user's id and username.
//! Handlers that require a caller take a [`Ctx`] argument; the extractor
//! decodes the Authorization header and rejects the request with a single
//! fixed 401 message, never revealing whether the token was missing,
//! malformed, or expired.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::config::AppState;
use crate::error::{Error, Result};

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id as a hex string.
    pub sub: String,
    pub username: String,
    /// Expiry, seconds since UNIX_EPOCH.
    pub exp: u64,
}

/// Sign a token for the given user.
pub fn encode_token(user_id: ObjectId, username: &str, key: &EncodingKey) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_hex(),
        username: username.to_string(),
        exp: seconds_from_now(TOKEN_TTL_SECS),
    };
    encode(&Header::default(), &claims, key).map_err(|e| Error::Internal(e.to_string()))
}

fn seconds_from_now(secs: u64) -> u64 {
    let expiry = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        + Duration::from_secs(secs);
    expiry.as_secs()
}

fn decode_token(token: &str, key: &DecodingKey) -> core::result::Result<Claims, jsonwebtoken::errors::Error> {
    let decoded = decode::<Claims>(token, key, &Validation::default())?;
    Ok(decoded.claims)
}

/// Pull the bearer token out of the Authorization header, if any.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ")
}

/// Best-effort identity: decode the bearer token if one is present and
/// valid, otherwise yield no identity. Decoding failures are logged and
/// swallowed; they never fail the request.
pub fn optional_claims(headers: &HeaderMap, key: &DecodingKey) -> Option<Claims> {
    let token = extract_token(headers)?;
    match decode_token(token, key) {
        Ok(claims) => Some(claims),
        Err(e) => {
            debug!("ignoring undecodable token: {e}");
            None
        }
    }
}

/// Verified caller identity, available to handlers as an extractor.
#[derive(Clone, Debug)]
pub struct Ctx {
    user_id: ObjectId,
    username: String,
}

impl Ctx {
    pub fn user_id(&self) -> ObjectId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl FromRequestParts<AppState> for Ctx {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = extract_token(&parts.headers).ok_or(Error::TokenMissingOrInvalid)?;
        let claims =
            decode_token(token, &state.dec_key).map_err(|_| Error::TokenMissingOrInvalid)?;
        let user_id =
            ObjectId::parse_str(&claims.sub).map_err(|_| Error::TokenMissingOrInvalid)?;

        Ok(Ctx {
            user_id,
            username: claims.username,
        })
    }
}
