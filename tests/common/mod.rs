#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use shaderhub::auth::SessionStore;
use shaderhub::server::{AppState, create_router};
use shaderhub::store::MemoryStore;
use shaderhub::types::{NewShader, ShaderScript};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::in_memory())
    }

    pub fn open(path: &Path) -> Self {
        Self::with_store(MemoryStore::open(path).expect("open store"))
    }

    fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let state = Arc::new(AppState::new(
            store.clone(),
            SessionStore::new(Duration::hours(1)),
        ));
        Self {
            router: create_router(state),
            store,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    /// Registers `username` and returns its session token.
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({"username": username, "password": "password123"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
        body["data"]["token"]
            .as_str()
            .expect("session token")
            .to_string()
    }

    pub async fn create_shader(&self, token: &str, name: &str, tags: &[&str]) -> u64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/shaders",
                Some(token),
                Some(serde_json::json!({
                    "name": name,
                    "scripts": [{
                        "id": 1,
                        "code": "@fragment fn main() -> @location(0) vec4f { return vec4f(1.0); }",
                        "buffer": {"format": "rgba8unorm", "width": 256, "height": 256}
                    }],
                    "tags": tags,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create {name}: {body}");
        body["data"]["id"].as_u64().expect("shader id")
    }
}

pub fn ids(items: &Value) -> Vec<u64> {
    items
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["id"].as_u64().expect("id"))
        .collect()
}

pub fn new_shader(owner_id: u64, name: &str, tags: &[&str]) -> NewShader {
    NewShader {
        owner_id,
        name: name.to_string(),
        scripts: vec![ShaderScript {
            id: 1,
            code: format!("// {name}\nvoid main() {{}}"),
            kind: Default::default(),
            buffer: Default::default(),
            compute: None,
        }],
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
    }
}
