#![allow(dead_code)]

use artfolio::config::Config;
use artfolio::db;
use artfolio::domain::{ArtworkInput, CollectionInput, PostInput};
use artfolio::infrastructure::AppState;
use artfolio::infrastructure::auth::{create_jwt, hash_password};
use artfolio::models::{ArtworkStatus, PostStatus, user};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use sea_orm::{EntityTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

pub struct TestApp {
    pub state: AppState,
    pub config: Config,
    // keeps the media directory alive for the test
    pub media_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        artfolio::server::build_router_with_state(self.state.clone(), &self.config)
    }
}

pub async fn setup() -> TestApp {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let media_dir = tempfile::tempdir().expect("Failed to create media dir");
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        media_root: media_dir.path().to_path_buf(),
        ..Config::default()
    };
    let state = AppState::new(db, &config);
    TestApp {
        state,
        config,
        media_dir,
    }
}

pub fn artwork(title: &str, width_cm: i32, height_cm: i32) -> ArtworkInput {
    ArtworkInput {
        title: title.to_string(),
        slug: None,
        tags: String::new(),
        category_id: None,
        theme_id: None,
        collection_id: None,
        status: ArtworkStatus::Available,
        price: None,
        purchase_url: String::new(),
        width_cm,
        height_cm,
        created_year: 2024,
        short_description: String::new(),
        description: String::new(),
    }
}

pub fn collection(name: &str) -> CollectionInput {
    CollectionInput {
        name: name.to_string(),
        slug: None,
        description: String::new(),
    }
}

pub fn post(title: &str, tags: &str, status: PostStatus) -> PostInput {
    PostInput {
        title: title.to_string(),
        slug: None,
        tags: tags.to_string(),
        content: format!("<p>{}</p>", title),
        status,
        published_at: None,
        excerpt: String::new(),
        author_id: None,
    }
}

/// Inserts a user and returns a bearer token for it
pub async fn token_for(state: &AppState, username: &str, role: &str) -> String {
    let now = chrono::Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password("password").unwrap()),
        role: Set(role.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = user::Entity::insert(user)
        .exec(state.db())
        .await
        .expect("Failed to create user");
    create_jwt(res.last_insert_id, username, role).unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, cookie, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _, body) = send(app, req).await;
    (status, body)
}
