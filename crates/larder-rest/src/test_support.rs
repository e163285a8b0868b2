//! Helpers for driving routers in unit tests.

use crate::middleware::CACHE_STATUS;
use axum::{
    body::Body,
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use larder_core::UserId;
use larder_security::CurrentUser;
use larder_service::{CacheInterface, MemoryCacheStore};
use serde_json::Value;
use tower::ServiceExt;

pub const USER_HEADER: &str = "x-test-user";

/// Stands in for the auth middleware: `x-test-user: <uuid>` becomes the caller.
pub async fn fake_auth(mut request: Request, next: Next) -> Response {
    let user = request
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| UserId::parse(v).ok());
    if let Some(id) = user {
        request
            .extensions_mut()
            .insert(CurrentUser::new(id, format!("kc-{id}"), "tester"));
    }
    next.run(request).await
}

/// Sends one request and returns status, `x-cache` header and JSON body.
pub async fn send(app: &Router, method: Method, uri: &str, user: Option<UserId>) -> (StatusCode, Option<String>, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user.to_string());
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let cache = response
        .headers()
        .get(CACHE_STATUS)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, cache, body)
}

/// Writes `{}` under every key, without expiry.
pub async fn seed(store: &MemoryCacheStore, keys: &[&str]) {
    for key in keys {
        store.set_raw(key, "{}", None).await.unwrap();
    }
}

/// Keys from `keys` still present in the store.
pub async fn surviving(store: &MemoryCacheStore, keys: &[&str]) -> Vec<String> {
    let mut left = Vec::new();
    for key in keys {
        if store.exists(key).await.unwrap() {
            left.push((*key).to_string());
        }
    }
    left
}
