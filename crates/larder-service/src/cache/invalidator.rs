//! Cache eviction after successful mutations.

use super::{CacheInterface, RequestContext};
use std::sync::Arc;
use tracing::{debug, error};

/// Per-route eviction declaration: ordered key templates.
///
/// Templates may contain `{userId}`, `{keycloakId}` and `{routeParam}`
/// placeholders. A resolved template containing `*` is deleted by pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvictionSpec {
    pub templates: Vec<String>,
}

impl EvictionSpec {
    #[must_use]
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
        }
    }
}

/// Deletes cache entries named by an [`EvictionSpec`].
#[derive(Clone)]
pub struct CacheInvalidator {
    store: Arc<dyn CacheInterface>,
}

impl CacheInvalidator {
    #[must_use]
    pub fn new(store: Arc<dyn CacheInterface>) -> Self {
        Self { store }
    }

    /// Resolves every template against the request, in declared order.
    #[must_use]
    pub fn resolve_keys(spec: &EvictionSpec, ctx: &RequestContext) -> Vec<String> {
        spec.templates
            .iter()
            .map(|template| ctx.resolve_template(template))
            .collect()
    }

    /// Deletes the resolved keys one by one. Returns how many entries went away.
    ///
    /// A failed deletion is logged and does not stop the remaining ones.
    pub async fn evict(&self, spec: &EvictionSpec, ctx: &RequestContext) -> u64 {
        let mut removed = 0;

        for key in Self::resolve_keys(spec, ctx) {
            let result = if key.contains('*') {
                self.store.delete_pattern(&key).await
            } else {
                self.store.delete(&key).await.map(u64::from)
            };

            match result {
                Ok(count) => {
                    debug!(cache_key = %key, removed = count, "evicted cache key");
                    removed += count;
                }
                Err(e) => error!(cache_key = %key, error = %e, "cache eviction failed"),
            }
        }

        removed
    }
}

impl std::fmt::Debug for CacheInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheInvalidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MockCacheInterface;
    use http::Method;
    use larder_core::LarderError;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn invalidator(mock: MockCacheInterface) -> CacheInvalidator {
        CacheInvalidator::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_evicts_in_declared_order() {
        let mut mock = MockCacheInterface::new();
        let mut seq = Sequence::new();
        mock.expect_delete()
            .with(eq("foods:list"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock.expect_delete()
            .with(eq("foods:count"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let spec = EvictionSpec::new(["foods:list", "foods:count"]);
        let ctx = RequestContext::new(Method::POST).with_user("user123", "kc");

        assert_eq!(invalidator(mock).evict(&spec, &ctx).await, 1);
    }

    #[tokio::test]
    async fn test_route_param_placeholder_is_substituted() {
        let mut mock = MockCacheInterface::new();
        mock.expect_delete()
            .with(eq("food:food-1"))
            .times(1)
            .returning(|_| Ok(true));

        let spec = EvictionSpec::new(["food:{id}"]);
        let ctx = RequestContext::new(Method::PATCH).with_route_param("id", "food-1");

        assert_eq!(invalidator(mock).evict(&spec, &ctx).await, 1);
    }

    #[tokio::test]
    async fn test_glob_templates_delete_by_pattern() {
        let mut mock = MockCacheInterface::new();
        mock.expect_delete_pattern()
            .with(eq("food:*:id:food-1*"))
            .times(1)
            .returning(|_| Ok(3));
        mock.expect_delete_pattern()
            .with(eq("foods:list*"))
            .times(1)
            .returning(|_| Ok(2));
        mock.expect_delete().never();

        let spec = EvictionSpec::new(["food:*:id:{id}*", "foods:list*"]);
        let ctx = RequestContext::new(Method::PATCH).with_route_param("id", "food-1");

        assert_eq!(invalidator(mock).evict(&spec, &ctx).await, 5);
    }

    #[tokio::test]
    async fn test_failed_deletion_does_not_stop_the_rest() {
        let mut mock = MockCacheInterface::new();
        mock.expect_delete()
            .with(eq("user_keycloak:kc-1"))
            .times(1)
            .returning(|_| Ok(true));
        mock.expect_delete_pattern()
            .with(eq("user_me:u1*"))
            .times(1)
            .returning(|_| Err(LarderError::Cache("timeout".to_string())));

        let spec = EvictionSpec::new(["user_me:{userId}*", "user_keycloak:{keycloakId}"]);
        let ctx = RequestContext::new(Method::DELETE).with_user("u1", "kc-1");

        assert_eq!(invalidator(mock).evict(&spec, &ctx).await, 1);
    }

    #[test]
    fn test_resolve_keys_with_missing_values() {
        let spec = EvictionSpec::new(["food:{id}", "food_barcode:{barcode}", "meals:{userId}"]);
        let ctx = RequestContext::new(Method::POST);

        assert_eq!(
            CacheInvalidator::resolve_keys(&spec, &ctx),
            vec!["food:", "food_barcode:", "meals:anonymous"]
        );
    }
}
