//! MongoDB persistence layer.
//!
//! All state lives here; handlers never share in-process mutable state.
//! The like toggle is issued as a single atomic update so concurrent
//! toggles cannot lose increments.

use std::collections::HashMap;

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::error::Result;
use crate::models::{Blog, Comment, OwnerInfo, User};

pub struct Store {
    blogs: Collection<Blog>,
    users: Collection<User>,
}

impl Store {
    pub fn new(db: &Database) -> Self {
        Self {
            blogs: db.collection("blogs"),
            users: db.collection("users"),
        }
    }

    // ----- blogs -----

    pub async fn list_blogs(&self) -> Result<Vec<Blog>> {
        let cursor = self.blogs.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_blog(&self, id: ObjectId) -> Result<Option<Blog>> {
        Ok(self.blogs.find_one(doc! { "_id": id }).await?)
    }

    pub async fn insert_blog(&self, blog: &Blog) -> Result<()> {
        self.blogs.insert_one(blog).await?;
        Ok(())
    }

    /// Returns false when no blog had the given id.
    pub async fn delete_blog(&self, id: ObjectId) -> Result<bool> {
        let deleted = self.blogs.find_one_and_delete(doc! { "_id": id }).await?;
        Ok(deleted.is_some())
    }

    /// Apply a partial `$set` update and return the updated document,
    /// or None when the id does not exist.
    pub async fn apply_blog_update(&self, id: ObjectId, set: Document) -> Result<Option<Blog>> {
        if set.is_empty() {
            return self.find_blog(id).await;
        }
        let updated = self
            .blogs
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    /// Flip the subject's like on a blog in one atomic update: membership
    /// in likedBy and the likes counter always move together.
    pub async fn toggle_like(
        &self,
        id: ObjectId,
        user_id: ObjectId,
        already_liked: bool,
    ) -> Result<Option<Blog>> {
        let updated = self
            .blogs
            .find_one_and_update(doc! { "_id": id }, like_update(user_id, already_liked))
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    /// Append a comment and return the updated blog, or None when the id
    /// does not exist.
    pub async fn push_comment(&self, id: ObjectId, comment: &Comment) -> Result<Option<Blog>> {
        let updated = self
            .blogs
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$push": { "comments": to_bson(comment)? } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    // ----- owner expansion -----

    /// Fetch the public fields of every owner referenced by `blogs`,
    /// keyed by user id. One query, explicit join.
    pub async fn owners_for(&self, blogs: &[Blog]) -> Result<HashMap<ObjectId, OwnerInfo>> {
        let ids: Vec<ObjectId> = blogs.iter().filter_map(|b| b.user).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cursor = self.users.find(doc! { "_id": { "$in": ids } }).await?;
        let users: Vec<User> = cursor.try_collect().await?;

        Ok(users
            .into_iter()
            .filter_map(|u| {
                let id = u.id?;
                Some((
                    id,
                    OwnerInfo {
                        id: id.to_hex(),
                        username: u.username,
                        name: u.name,
                    },
                ))
            })
            .collect())
    }

    pub async fn owner_of(&self, blog: &Blog) -> Result<Option<OwnerInfo>> {
        let Some(user_id) = blog.user else {
            return Ok(None);
        };
        Ok(self.find_user(user_id).await?.map(|u| OwnerInfo {
            id: user_id.to_hex(),
            username: u.username,
            name: u.name,
        }))
    }

    // ----- users -----

    pub async fn find_user(&self, id: ObjectId) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "username": username }).await?)
    }

    pub async fn insert_user(&self, user: &User) -> Result<()> {
        self.users.insert_one(user).await?;
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let cursor = self.users.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Record a newly created blog on its owner. Append-only.
    pub async fn add_blog_to_user(&self, user_id: ObjectId, blog_id: ObjectId) -> Result<()> {
        self.users
            .update_one(doc! { "_id": user_id }, doc! { "$push": { "blogs": blog_id } })
            .await?;
        Ok(())
    }
}

fn like_update(user_id: ObjectId, already_liked: bool) -> Document {
    if already_liked {
        doc! { "$pull": { "likedBy": user_id }, "$inc": { "likes": -1 } }
    } else {
        doc! { "$addToSet": { "likedBy": user_id }, "$inc": { "likes": 1 } }
    }
}
