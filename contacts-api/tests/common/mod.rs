//! Common test utilities for API tests
//!
//! Builds the real router over in-memory stores and cache, with a mailer
//! that records messages and a media store that returns a fixed CDN URL.
//! Requests are driven with `tower::ServiceExt::oneshot`, no socket needed.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use contacts_api::{
    app::{build_router, AppState},
    config::{ApiConfig, CacheConfig, Config, DatabaseConfig, JwtConfig},
};
use contacts_shared::{
    auth::jwt::TokenIssuer,
    cache::{redis::RedisConfig, MemoryIdentityCache},
    services::{
        email::{EmailError, Mailer},
        media::{MediaError, MediaStore},
        AuthGateway, ContactsGateway,
    },
    store::{MemoryContactStore, MemoryUserStore},
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "testpassword123";

/// Sent email as `(to, subject, html)`
pub type SentMail = (String, String, String);

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html.to_string()));
        Ok(())
    }
}

pub struct FakeMedia;

#[async_trait]
impl MediaStore for FakeMedia {
    async fn upload_avatar(
        &self,
        user_id: i64,
        _data: Bytes,
        _filename: &str,
    ) -> Result<String, MediaError> {
        Ok(avatar_url(user_id))
    }
}

pub fn avatar_url(user_id: i64) -> String {
    format!("https://res.cloudinary.com/demo/image/upload/avatars/avatar_{}", user_id)
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
            base_url: "http://testserver".to_string(),
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_expire_minutes: 30,
        },
        redis: RedisConfig::default(),
        cache: CacheConfig { user_ttl_secs: 300 },
        mail: None,
        media: None,
    }
}

/// Test context holding the router and handles to observable backends
pub struct TestContext {
    pub app: Router,
    pub cache: Arc<MemoryIdentityCache>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let cache = Arc::new(MemoryIdentityCache::new());
        let mailer = Arc::new(RecordingMailer::default());

        let auth = AuthGateway::new(
            Arc::new(MemoryUserStore::new()),
            cache.clone(),
            mailer.clone(),
            Arc::new(FakeMedia),
            TokenIssuer::new(JWT_SECRET, chrono::Duration::minutes(30)),
        )
        .with_base_url(config.api.base_url.clone());
        let contacts = ContactsGateway::new(Arc::new(MemoryContactStore::new()));

        Self {
            app: build_router(AppState::new(auth, contacts, config)),
            cache,
            mailer,
        }
    }

    /// Sends a request and returns status plus JSON body (`Null` if empty)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request("POST", uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request("PUT", uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("DELETE", uri, token, None)).await
    }

    /// Registers a user and returns the response body
    pub async fn register(&self, username: &str, email: &str) -> Value {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({ "username": username, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/login",
                None,
                json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Registers and logs in, returning `(user_id, token)`
    pub async fn signup(&self, username: &str, email: &str) -> (i64, String) {
        let user = self.register(username, email).await;
        let token = self.login(email).await;
        (user["id"].as_i64().unwrap(), token)
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Builds a multipart/form-data body with a single file field
pub fn multipart_request(uri: &str, token: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "contacts-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn contact_json(first_name: &str, last_name: &str, email: &str, birthday: &str) -> Value {
    json!({
        "first_name": first_name,
        "last_name": last_name,
        "email": email,
        "phone": "+380501234567",
        "birthday": birthday,
        "additional_data": null
    })
}
