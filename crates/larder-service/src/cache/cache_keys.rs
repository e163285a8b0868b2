//! Cache key construction.
//!
//! Response keys have the shape
//! `baseKey:userIdentity[:routeParamName:value]*[:base64(querystring)]`.
//! The query segment is the URL-encoded query string of every parameter,
//! encoded with the standard padded base64 alphabet. It is only present when
//! at least one parameter has a non-empty value.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Identity segment used when the request carries no resolved user.
pub const ANONYMOUS: &str = "anonymous";

/// Bytes left unescaped in query components: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds the cache key for a response.
///
/// `route_params` must be in route declaration order and `query` in the
/// order received. Parameters with empty values are serialized like any
/// other, but a query made only of empty values adds no segment.
#[must_use]
pub fn build_cache_key(
    base_key: &str,
    user_identity: Option<&str>,
    route_params: &[(String, String)],
    query: &[(String, String)],
) -> String {
    let mut key = String::with_capacity(base_key.len() + 48);
    key.push_str(base_key);
    key.push(':');
    key.push_str(user_identity.unwrap_or(ANONYMOUS));

    for (name, value) in route_params {
        key.push(':');
        key.push_str(name);
        key.push(':');
        key.push_str(value);
    }

    if let Some(query_string) = encode_query(query) {
        key.push(':');
        key.push_str(&STANDARD.encode(query_string));
    }

    key
}

/// Serializes the query as `name=value&name=value`, or `None` when no
/// parameter has a value.
fn encode_query(query: &[(String, String)]) -> Option<String> {
    if query.iter().all(|(_, value)| value.is_empty()) {
        return None;
    }

    let pairs: Vec<String> = query
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(name, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect();
    Some(pairs.join("&"))
}

/// Parses a raw query string into ordered, decoded name/value pairs.
#[must_use]
pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    })
    .unwrap_or_default()
}

/// Key under which the identity lookup for a token subject is cached.
#[must_use]
pub fn user_by_keycloak_id(keycloak_id: &str) -> String {
    format!("user_keycloak:{keycloak_id}")
}
