//! Shared harness for the HTTP API tests.
//!
//! Tests run against a real MongoDB named per test so they can run in
//! parallel. When TEST_MONGODB_URI is unset the spawn helper yields None
//! and the test skips.

#![allow(dead_code)]

use std::sync::Arc;

use jsonwebtoken::EncodingKey;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Database};

use bloglist::config::AppState;
use bloglist::models::{Blog, User};
use bloglist::store::Store;

pub const SECRET: &str = "secret";

pub struct TestApp {
    base: String,
    pub http: reqwest::Client,
    pub db: Database,
    pub store: Arc<Store>,
}

pub async fn spawn(db_name: &str) -> Option<TestApp> {
    let uri = std::env::var("TEST_MONGODB_URI").ok()?;

    let client = Client::with_uri_str(&uri).await.ok()?;
    let db = client.database(db_name);
    let store = Arc::new(Store::new(&db));
    let state = AppState::new(store.clone(), SECRET);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = bloglist::app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    let app = TestApp {
        base,
        http: reqwest::Client::new(),
        db,
        store,
    };
    app.reset().await;
    Some(app)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn reset(&self) {
        self.db
            .collection::<Blog>("blogs")
            .delete_many(doc! {})
            .await
            .expect("clear blogs");
        self.db
            .collection::<User>("users")
            .delete_many(doc! {})
            .await
            .expect("clear users");
    }

    pub async fn blog_count(&self) -> u64 {
        self.db
            .collection::<Blog>("blogs")
            .count_documents(doc! {})
            .await
            .expect("count blogs")
    }

    pub async fn user_count(&self) -> u64 {
        self.db
            .collection::<User>("users")
            .count_documents(doc! {})
            .await
            .expect("count users")
    }

    /// Insert a user directly, bypassing the API.
    pub async fn seed_user(&self, username: &str, password: &str) -> User {
        let user = User {
            id: Some(ObjectId::new()),
            username: username.to_string(),
            name: Some("Superuser".to_string()),
            // Minimum cost keeps the test suite fast.
            password_hash: bcrypt::hash(password, 4).expect("hash password"),
            blogs: Vec::new(),
        };
        self.store.insert_user(&user).await.expect("seed user");
        user
    }

    /// Insert a blog directly, bypassing the API.
    pub async fn seed_blog(&self, title: &str, likes: i64, owner: Option<ObjectId>) -> Blog {
        let blog = Blog {
            id: Some(ObjectId::new()),
            title: title.to_string(),
            author: Some("Seeded Author".to_string()),
            likes,
            is_anonymous: false,
            liked_by: Vec::new(),
            comments: Vec::new(),
            user: owner,
        };
        self.store.insert_blog(&blog).await.expect("seed blog");
        blog
    }

    /// A token the API will accept for the given seeded user.
    pub fn token_for(&self, user: &User) -> String {
        self.token_for_subject(user.id.expect("seeded user id"), &user.username)
    }

    /// A validly signed token for an arbitrary subject, whether or not a
    /// matching user document exists.
    pub fn token_for_subject(&self, user_id: ObjectId, username: &str) -> String {
        bloglist::auth::encode_token(
            user_id,
            username,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("sign test token")
    }
}
