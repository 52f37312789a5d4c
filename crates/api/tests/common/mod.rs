#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use studio_api::auth::jwt::{generate_access_token, JwtConfig};
use studio_api::auth::password::hash_password;
use studio_api::config::{LogFormat, ServerConfig};
use studio_api::router::build_app_router;
use studio_api::state::AppState;
use studio_core::roles::Role;
use studio_db::models::user::{CreateUser, User};
use studio_db::{MemoryStore, UserRepo};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 60,
        },
        log_format: LogFormat::Pretty,
        seed_admin: None,
    }
}

/// An application wired to a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: ServerConfig,
}

impl TestApp {
    /// The router to drive with `oneshot` (consumed per request).
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Insert a user straight into the store. The account has no usable
    /// password; use [`TestApp::seed_user_with_password`] for login tests.
    pub async fn seed_user(&self, name: &str, role: Role) -> User {
        self.insert_user(name, role, "unusable".to_string()).await
    }

    /// Insert a user whose password is [`TEST_PASSWORD`].
    pub async fn seed_user_with_password(&self, name: &str, role: Role) -> User {
        let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
        self.insert_user(name, role, password_hash).await
    }

    async fn insert_user(&self, name: &str, role: Role, password_hash: String) -> User {
        self.store
            .create_user(&CreateUser {
                name: name.to_string(),
                email: format!("{}@studio.test", name.to_lowercase()),
                role,
                password_hash,
            })
            .await
            .expect("user creation should succeed")
    }

    /// Mint an access token for `user`.
    pub fn token_for(&self, user: &User) -> String {
        generate_access_token(user.id, user.role, &self.config.jwt)
            .expect("token generation should succeed")
    }

    /// Seed a user with `role` and return it with a token.
    pub async fn login_as(&self, name: &str, role: Role) -> (User, String) {
        let user = self.seed_user(name, role).await;
        let token = self.token_for(&user);
        (user, token)
    }
}

/// Build the full application router (same middleware stack as the binary)
/// on top of an empty [`MemoryStore`].
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
    };
    let router = build_app_router(state, &config).expect("test config should be valid");
    TestApp {
        router,
        store,
        config,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("request should succeed")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn delete_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a client through the API and return its id.
pub async fn create_client(app: &TestApp, token: &str, name: &str) -> i64 {
    let body = serde_json::json!({
        "name": name,
        "email": format!("{}@client.test", name.to_lowercase().replace(' ', "-")),
    });
    let response = post_json_auth(app.app(), "/api/clients", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED, "client creation should succeed");
    body_json(response).await["data"]["id"]
        .as_i64()
        .expect("client id")
}

/// Create a project through the API and return the `data` payload.
pub async fn create_project(app: &TestApp, token: &str, body: Value) -> Value {
    let response = post_json_auth(app.app(), "/api/projects", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED, "project creation should succeed");
    body_json(response).await["data"].clone()
}
