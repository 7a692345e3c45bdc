//! Value list cache using moka
//!
//! External lists (labels, users, ...) change rarely compared to how often
//! they are checked, so resolved lists are kept for a bounded time.

use super::ValueResolver;
use crate::config::ValueCacheConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use moka::future::Cache;
use std::fmt;
use std::sync::Arc;
use workitems_model::ValueProviderDescriptor;

type CacheKey = (String, ValueProviderDescriptor);

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverCacheStats {
    /// Number of cached lists
    pub entry_count: u64,
}

/// Resolver decorator caching successful resolutions
///
/// Failures are not cached; the next lookup asks the inner resolver again.
#[derive(Clone)]
pub struct CachingValueResolver {
    inner: Arc<dyn ValueResolver>,
    cache: Cache<CacheKey, Arc<Vec<String>>>,
}

impl CachingValueResolver {
    /// Wrap `inner` with the given cache settings
    #[must_use]
    pub fn new(inner: Arc<dyn ValueResolver>, config: &ValueCacheConfig) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(config.ttl())
                .build(),
        }
    }

    /// Drop every cached list
    #[inline]
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> ResolverCacheStats {
        ResolverCacheStats {
            entry_count: self.cache.entry_count(),
        }
    }
}

impl fmt::Debug for CachingValueResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingValueResolver")
            .field("entry_count", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ValueResolver for CachingValueResolver {
    async fn resolve(
        &self,
        project_code: &str,
        provider: &ValueProviderDescriptor,
    ) -> Result<Vec<String>, ProviderError> {
        let key = (project_code.to_string(), provider.clone());

        let values = self
            .cache
            .try_get_with(key, async {
                self.inner
                    .resolve(project_code, provider)
                    .await
                    .map(Arc::new)
            })
            .await
            .map_err(|e: Arc<ProviderError>| (*e).clone())?;

        Ok(values.as_ref().clone())
    }
}
