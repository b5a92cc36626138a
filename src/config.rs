//! Process configuration and shared application state.

use std::sync::Arc;

use anyhow::{bail, Context};
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::store::Store;

/// Configuration read once at startup from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub mongodb_uri: String,
    pub secret: String,
}

impl Config {
    /// Read PORT, MONGODB_URI (TEST_MONGODB_URI takes precedence) and
    /// SECRET. A missing connection string or signing secret is fatal.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => 3003,
        };

        let mongodb_uri = std::env::var("TEST_MONGODB_URI")
            .or_else(|_| std::env::var("MONGODB_URI"))
            .unwrap_or_default();
        if mongodb_uri.is_empty() {
            bail!("MONGODB_URI is not defined. Set it in the environment.");
        }

        let secret = std::env::var("SECRET").unwrap_or_default();
        if secret.is_empty() {
            bail!("SECRET is not defined. Set it in the environment.");
        }

        Ok(Self {
            port,
            mongodb_uri,
            secret,
        })
    }
}

/// App state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub enc_key: EncodingKey,
    pub dec_key: DecodingKey,
}

impl AppState {
    pub fn new(store: Arc<Store>, secret: &str) -> Self {
        Self {
            store,
            enc_key: EncodingKey::from_secret(secret.as_bytes()),
            dec_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}
