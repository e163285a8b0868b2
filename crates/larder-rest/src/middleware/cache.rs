//! Per-route response caching and eviction.
//!
//! Routes opt in through [`HttpCache::cached`] and [`HttpCache::evicting`],
//! which wrap a single method router with a middleware bound to the route's
//! declaration. Cached GET responses are the full JSON envelope the handler
//! produced; a hit is served without running the handler.

use axum::{
    body::{Body, HttpBody},
    extract::{RawPathParams, Request, State},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderName, HeaderValue, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Json,
};
use larder_config::CacheConfig;
use larder_security::CurrentUser;
use larder_service::{
    CacheInterface, CacheInvalidator, CacheKeySpec, CacheLookup, EvictionSpec, RequestContext, ResponseCache,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Response header reporting how the cache handled a request.
pub const CACHE_STATUS: HeaderName = HeaderName::from_static("x-cache");

const HIT: HeaderValue = HeaderValue::from_static("HIT");
const MISS: HeaderValue = HeaderValue::from_static("MISS");

/// Read and eviction sides of the HTTP cache, sharing one store.
#[derive(Clone)]
pub struct HttpCache {
    responses: Arc<ResponseCache>,
    invalidator: Arc<CacheInvalidator>,
    max_body_bytes: usize,
}

impl HttpCache {
    pub fn new(store: Arc<dyn CacheInterface>, config: &CacheConfig) -> Self {
        Self {
            responses: Arc::new(ResponseCache::new(store.clone()).enabled(config.enabled)),
            invalidator: Arc::new(CacheInvalidator::new(store)),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Serves `route` from the cache under `base_key` for `ttl_seconds`.
    pub fn cached<S>(&self, route: MethodRouter<S>, base_key: &str, ttl_seconds: u64) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let declaration = CacheableRoute {
            cache: self.responses.clone(),
            spec: Arc::new(CacheKeySpec::new(base_key, Some(ttl_seconds))),
            max_body_bytes: self.max_body_bytes,
        };
        route.layer(middleware::from_fn_with_state(declaration, cacheable))
    }

    /// Deletes the keys named by `templates` after `route` succeeds.
    pub fn evicting<S, I, T>(&self, route: MethodRouter<S>, templates: I) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let declaration = EvictingRoute {
            invalidator: self.invalidator.clone(),
            spec: Arc::new(EvictionSpec::new(templates)),
        };
        route.layer(middleware::from_fn_with_state(declaration, evicting))
    }
}

impl std::fmt::Debug for HttpCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCache")
            .field("enabled", &self.responses.is_enabled())
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct CacheableRoute {
    cache: Arc<ResponseCache>,
    spec: Arc<CacheKeySpec>,
    max_body_bytes: usize,
}

#[derive(Clone)]
struct EvictingRoute {
    invalidator: Arc<CacheInvalidator>,
    spec: Arc<EvictionSpec>,
}

fn request_context(request: &Request, params: Option<RawPathParams>) -> RequestContext {
    let mut ctx = RequestContext::new(request.method().clone()).with_raw_query(request.uri().query());

    if let Some(user) = request.extensions().get::<CurrentUser>() {
        ctx = ctx.with_user(user.id.to_string(), user.keycloak_id.clone());
    }
    if let Some(params) = params {
        ctx = ctx.with_route_params(
            params
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        );
    }

    ctx
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

async fn cacheable(
    State(route): State<CacheableRoute>,
    params: Option<RawPathParams>,
    request: Request,
    next: Next,
) -> Response {
    let ctx = request_context(&request, params);
    let Some(key) = route.cache.key_for(Some(&route.spec), &ctx) else {
        return next.run(request).await;
    };

    match route.cache.lookup(&key).await {
        CacheLookup::Hit(value) => {
            let mut response = Json(value).into_response();
            response.headers_mut().insert(CACHE_STATUS, HIT);
            return response;
        }
        // store unreachable: serve uncached
        CacheLookup::Unavailable => return next.run(request).await,
        CacheLookup::Miss => {}
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK || !is_json(&response) {
        return response;
    }

    let fits = response
        .body()
        .size_hint()
        .exact()
        .is_some_and(|len| len <= route.max_body_bytes as u64);
    if !fits {
        debug!(cache_key = %key, "response body too large or unsized, not caching");
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, route.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(cache_key = %key, error = %e, "failed to buffer response body, not caching");
            parts.headers.remove(CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            if route.cache.store(&key, &route.spec, &value).await {
                parts.headers.insert(CACHE_STATUS, MISS);
            }
        }
        Err(e) => warn!(cache_key = %key, error = %e, "response is not valid JSON, not caching"),
    }

    Response::from_parts(parts, Body::from(bytes))
}

async fn evicting(
    State(route): State<EvictingRoute>,
    params: Option<RawPathParams>,
    request: Request,
    next: Next,
) -> Response {
    let ctx = request_context(&request, params);
    let response = next.run(request).await;

    if response.status().is_success() {
        let removed = route.invalidator.evict(&route.spec, &ctx).await;
        debug!(removed, "evicted cache entries after mutation");
    }

    response
}
