//! Request handlers.

pub mod blogs;
pub mod login;
pub mod users;

use mongodb::bson::oid::ObjectId;

use crate::error::{Error, Result};

/// Attribution label used when no verified identity is available.
pub const ANONYMOUS: &str = "Anonymous";

/// Parse a path segment into an ObjectId. Malformed ids are a client
/// error, not a lookup miss.
fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| Error::Validation("malformed id".to_string()))
}

pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_hex_object_ids_only() {
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex()).unwrap(), id);

        let err = parse_id("not-an-id").unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "malformed id"));
    }
}
