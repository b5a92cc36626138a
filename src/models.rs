//! Document models and their outward representations.
//!
//! Stored documents use BSON field names matching the wire format
//! (camelCase, `_id`). Response types are separate: they expose a string
//! `id` and never leak `_id` or the password hash.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Blog document stored in the `blogs` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub liked_by: Vec<ObjectId>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub user: Option<ObjectId>,
}

/// Comment embedded in a blog document. `date` is stamped by the server
/// when the comment is appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub username: String,
    pub date: mongodb::bson::DateTime,
}

/// User document stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub password_hash: String,
    #[serde(default)]
    pub blogs: Vec<ObjectId>,
}

/// Owner of a blog in a response: either the bare id, or the owner's
/// public fields when the handler asked the store to expand it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(String),
    Expanded(OwnerInfo),
}

/// Public fields of a blog's owning user.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerInfo {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub likes: i64,
    pub is_anonymous: bool,
    pub liked_by: Vec<String>,
    pub comments: Vec<CommentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerRef>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub text: String,
    pub username: String,
    pub date: DateTime<Utc>,
}

impl Blog {
    /// Response with the owner left as a bare id string.
    pub fn into_response(self) -> BlogResponse {
        let owner = self.user.map(|u| OwnerRef::Id(u.to_hex()));
        self.into_response_with(owner)
    }

    /// Response with the owner expanded to public fields, when known.
    pub fn into_expanded_response(self, owner: Option<OwnerInfo>) -> BlogResponse {
        let owner = owner
            .map(OwnerRef::Expanded)
            .or_else(|| self.user.map(|u| OwnerRef::Id(u.to_hex())));
        self.into_response_with(owner)
    }

    fn into_response_with(self, user: Option<OwnerRef>) -> BlogResponse {
        BlogResponse {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: self.title,
            author: self.author,
            likes: self.likes,
            is_anonymous: self.is_anonymous,
            liked_by: self.liked_by.iter().map(|id| id.to_hex()).collect(),
            comments: self
                .comments
                .into_iter()
                .map(|c| CommentResponse {
                    text: c.text,
                    username: c.username,
                    date: c.date.to_chrono(),
                })
                .collect(),
            user,
        }
    }
}

/// Public user info (no password hash).
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub blogs: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username,
            name: user.name,
            blogs: user.blogs.iter().map(|id| id.to_hex()).collect(),
        }
    }
}
