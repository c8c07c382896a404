#![allow(dead_code)]
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::Service;

use configs::{AppConfig, DatabaseConfig, StorageBackend};

pub fn memory_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg
}

pub fn sqlite_config() -> AppConfig {
    let mut cfg = memory_config();
    cfg.storage.backend = StorageBackend::Database;
    cfg.database = DatabaseConfig::sqlite_memory();
    cfg
}

pub async fn app(cfg: &AppConfig) -> anyhow::Result<Router> {
    server::build_app(cfg).await
}

pub struct Reply {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

pub async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<Reply> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&v)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().call(req).await?;
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok(Reply { status, set_cookie, body })
}

/// Registers `username` and returns `(user id, bearer token)`.
pub async fn register(app: &Router, username: &str) -> anyhow::Result<(i64, String)> {
    let r = call(
        app,
        Method::POST,
        "/api/register",
        None,
        Some(serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123",
            "name": username,
        })),
    )
    .await?;
    assert_eq!(r.status, StatusCode::CREATED, "register {username}: {}", r.body);
    let id = r.body["user"]["id"].as_i64().unwrap_or_default();
    let token = r.body["token"].as_str().unwrap_or_default().to_string();
    Ok((id, token))
}

pub fn business_body(category_id: i64, name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "description": format!("{name} sells things"),
        "categoryId": category_id,
        "address": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "zipCode": "62701",
    })
}
