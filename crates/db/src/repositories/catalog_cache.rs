//! Resource-type catalog caching using Moka.
//!
//! The catalog is read on every authorization check and changes rarely, so a
//! single shared snapshot is kept for a short TTL and dropped on writes.

use atrium_core::authz::ResourceCatalog;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Default time-to-live for the cached catalog.
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 60;

/// Cache holding the current resource-type catalog.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<(), Arc<ResourceCatalog>>,
}

impl CatalogCache {
    /// Creates a cache with the given TTL.
    #[must_use]
    pub fn with_ttl(ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// The cached catalog, if present and fresh.
    #[must_use]
    pub fn get(&self) -> Option<Arc<ResourceCatalog>> {
        self.cache.get(&())
    }

    /// Stores a freshly loaded catalog.
    pub fn put(&self, catalog: Arc<ResourceCatalog>) {
        self.cache.insert((), catalog);
    }

    /// Drops the cached catalog.
    pub fn invalidate(&self) {
        self.cache.invalidate(&());
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CATALOG_TTL_SECS)
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("cached", &self.cache.contains_key(&()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::authz::ResourceType;
    use atrium_shared::types::ResourceTypeId;

    fn catalog() -> Arc<ResourceCatalog> {
        Arc::new(ResourceCatalog::new(vec![ResourceType {
            id: ResourceTypeId::new(),
            code: "Project".to_string(),
            name: "Projects".to_string(),
            icon: None,
        }]))
    }

    #[test]
    fn test_put_get_invalidate() {
        let cache = CatalogCache::default();
        assert!(cache.get().is_none());

        cache.put(catalog());
        assert_eq!(cache.get().map(|c| c.len()), Some(1));

        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
