//! Request facts the response cache and the invalidator key on.

use super::cache_keys::{self, ANONYMOUS};
use http::Method;

/// What the cache layer needs to know about an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    /// Internal id of the resolved user.
    pub user_id: Option<String>,
    /// Identity provider subject of the bearer token.
    pub keycloak_id: Option<String>,
    /// Route parameters in route declaration order.
    pub route_params: Vec<(String, String)>,
    /// Decoded query parameters in the order received.
    pub query: Vec<(String, String)>,
}

impl RequestContext {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            user_id: None,
            keycloak_id: None,
            route_params: Vec::new(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>, keycloak_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.keycloak_id = Some(keycloak_id.into());
        self
    }

    #[must_use]
    pub fn with_route_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_params.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_route_params(mut self, params: Vec<(String, String)>) -> Self {
        self.route_params = params;
        self
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Replaces the query parameters with those parsed from a raw query string.
    #[must_use]
    pub fn with_raw_query(mut self, raw: Option<&str>) -> Self {
        self.query = cache_keys::parse_query(raw);
        self
    }

    /// The user id, or `anonymous`.
    #[must_use]
    pub fn user_identity(&self) -> &str {
        self.user_id.as_deref().unwrap_or(ANONYMOUS)
    }

    #[must_use]
    pub fn route_param(&self, name: &str) -> Option<&str> {
        self.route_params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Substitutes `{placeholder}` segments of an eviction template.
    ///
    /// `{userId}` becomes the user identity (or `anonymous`), `{keycloakId}`
    /// the token subject, and any other name the route parameter of that
    /// name. Missing values become the empty string. An unterminated `{` is
    /// kept literally.
    #[must_use]
    pub fn resolve_template(&self, template: &str) -> String {
        let mut resolved = String::with_capacity(template.len() + 32);
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            resolved.push_str(&rest[..open]);
            resolved.push_str(self.placeholder(&rest[open + 1..close]));
            rest = &rest[close + 1..];
        }

        resolved.push_str(rest);
        resolved
    }

    fn placeholder(&self, name: &str) -> &str {
        match name {
            "userId" => self.user_identity(),
            "keycloakId" => self.keycloak_id.as_deref().unwrap_or(""),
            other => self.route_param(other).unwrap_or(""),
        }
    }
}
