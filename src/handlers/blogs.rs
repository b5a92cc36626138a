//! Blog resource handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use mongodb::bson::{oid::ObjectId, DateTime, Document};
use serde::Deserialize;
use tracing::info;

use super::{parse_id, ANONYMOUS};
use crate::auth::{self, Ctx};
use crate::config::AppState;
use crate::error::{Error, Result};
use crate::models::{Blog, BlogResponse, Comment};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub likes: Option<i64>,
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub likes: Option<i64>,
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub text: Option<String>,
}

/// GET /api/blogs
///
/// Full-table listing with owners expanded to their public fields.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BlogResponse>>> {
    let blogs = state.store.list_blogs().await?;
    let owners = state.store.owners_for(&blogs).await?;

    let out = blogs
        .into_iter()
        .map(|blog| {
            let owner = blog.user.and_then(|id| owners.get(&id).cloned());
            blog.into_expanded_response(owner)
        })
        .collect();
    Ok(Json(out))
}

/// POST /api/blogs (auth required)
pub async fn create(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<CreateBlogRequest>,
) -> Result<(StatusCode, Json<BlogResponse>)> {
    info!("POST /api/blogs by {}", ctx.username());

    let title = req
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Validation("title is required".to_string()))?;

    // The token must resolve to an actual account.
    let user = state
        .store
        .find_user(ctx.user_id())
        .await?
        .ok_or(Error::TokenMissingOrInvalid)?;

    let is_anonymous = req.is_anonymous.unwrap_or(false);
    let blog = Blog {
        id: Some(ObjectId::new()),
        title,
        author: if is_anonymous {
            Some(ANONYMOUS.to_string())
        } else {
            req.author
        },
        likes: req.likes.unwrap_or(0),
        is_anonymous,
        liked_by: Vec::new(),
        comments: Vec::new(),
        user: user.id,
    };

    state.store.insert_blog(&blog).await?;
    if let (Some(user_id), Some(blog_id)) = (user.id, blog.id) {
        state.store.add_blog_to_user(user_id, blog_id).await?;
    }

    Ok((StatusCode::CREATED, Json(blog.into_response())))
}

/// DELETE /api/blogs/{id}
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&id)?;

    if state.store.delete_blog(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound)
    }
}

/// PUT /api/blogs/{id}
///
/// Generic field-level update; validation re-applied to provided fields.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBlogRequest>,
) -> Result<Json<BlogResponse>> {
    let id = parse_id(&id)?;

    let mut set = Document::new();
    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        set.insert("title", title);
    }
    if let Some(author) = req.author {
        set.insert("author", author);
    }
    if let Some(likes) = req.likes {
        set.insert("likes", likes);
    }
    if let Some(is_anonymous) = req.is_anonymous {
        set.insert("isAnonymous", is_anonymous);
    }

    let updated = state
        .store
        .apply_blog_update(id, set)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(updated.into_response()))
}

/// PUT /api/blogs/{id}/like (auth required)
///
/// Toggle: repeated calls from the same subject alternate between
/// liked and not liked.
pub async fn toggle_like(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> Result<Json<BlogResponse>> {
    info!("PUT /api/blogs/{id}/like by {}", ctx.username());
    let id = parse_id(&id)?;

    let blog = state.store.find_blog(id).await?.ok_or(Error::NotFound)?;
    let already_liked = blog.liked_by.contains(&ctx.user_id());

    let updated = state
        .store
        .toggle_like(id, ctx.user_id(), already_liked)
        .await?
        .ok_or(Error::NotFound)?;

    let owner = state.store.owner_of(&updated).await?;
    Ok(Json(updated.into_expanded_response(owner)))
}

/// POST /api/blogs/{id}/comments
///
/// Auth is opportunistic: a verified token that resolves to a user
/// attributes the comment to that username, anything else degrades to
/// "Anonymous" without failing the request.
pub async fn add_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<BlogResponse>)> {
    let id = parse_id(&id)?;

    let text = req
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Validation("comment text missing".to_string()))?;

    let username = match commenter_id(&headers, &state) {
        Some(user_id) => state
            .store
            .find_user(user_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| ANONYMOUS.to_string()),
        None => ANONYMOUS.to_string(),
    };

    let comment = Comment {
        text,
        username,
        date: DateTime::now(),
    };

    let updated = state
        .store
        .push_comment(id, &comment)
        .await?
        .ok_or(Error::NotFound)?;
    Ok((StatusCode::CREATED, Json(updated.into_response())))
}

/// Subject of a verified bearer token, if one came with the request.
fn commenter_id(headers: &HeaderMap, state: &AppState) -> Option<ObjectId> {
    let claims = auth::optional_claims(headers, &state.dec_key)?;
    ObjectId::parse_str(&claims.sub).ok()
}
