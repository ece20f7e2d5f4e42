//! Lookup Registry
//!
//! Per-resource name <-> id caches. A cache is filled on first use and
//! thrown away by [`Registry::invalidate`]; the next access refetches it.
//! Rebuilds swap the whole `Arc`, so a reader holding the old cache never
//! observes a partially built one.

use super::catalog::ResourceDef;
use super::lookup::{records_of, LookupCache};
use crate::api::session::Session;
use crate::error::{AlanaError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared lookup caches keyed by resource key
#[derive(Clone, Default, Debug)]
pub struct Registry {
    caches: Arc<RwLock<HashMap<String, Arc<LookupCache>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the resource list and rebuild its cache
    ///
    /// Transport and status failures propagate. A body that is not a record
    /// list degrades to an empty cache.
    pub async fn load_lookup(&self, session: &Session, def: &ResourceDef) -> Result<Arc<LookupCache>> {
        let cache = match session.get(&def.collection_path(), None).await {
            Ok(response) => match records_of(&response) {
                Some(records) => LookupCache::from_records(records, &def.name_field),
                None => {
                    tracing::warn!("{}: list response is not a record list, using empty lookup", def.key);
                    LookupCache::empty()
                },
            },
            Err(AlanaError::MalformedResponse { reason, .. }) => {
                tracing::warn!("{}: undecodable list response ({}), using empty lookup", def.key, reason);
                LookupCache::empty()
            },
            Err(e) => return Err(e),
        };

        tracing::debug!("{}: lookup rebuilt with {} entries", def.key, cache.len());

        let cache = Arc::new(cache);
        {
            let mut caches = self.caches.write().await;
            caches.insert(def.key.clone(), cache.clone());
        }

        Ok(cache)
    }

    /// Cached lookup, loading it on first access
    pub async fn lookup(&self, session: &Session, def: &ResourceDef) -> Result<Arc<LookupCache>> {
        if let Some(cache) = self.cached(&def.key).await {
            return Ok(cache);
        }
        self.load_lookup(session, def).await
    }

    /// Current cache without fetching
    pub async fn cached(&self, key: &str) -> Option<Arc<LookupCache>> {
        let caches = self.caches.read().await;
        caches.get(key).cloned()
    }

    /// Name -> id against the current cache
    ///
    /// A miss is reported as [`AlanaError::NameNotFound`]; it never triggers a
    /// refetch of an already loaded cache.
    pub async fn resolve_id(&self, session: &Session, def: &ResourceDef, name: &str) -> Result<i64> {
        let cache = self.lookup(session, def).await?;
        cache.id_of(name).ok_or_else(|| AlanaError::NameNotFound {
            resource: def.key.clone(),
            name: name.to_string(),
        })
    }

    /// Id -> name against the current cache
    pub async fn resolve_name(&self, session: &Session, def: &ResourceDef, id: i64) -> Result<String> {
        let cache = self.lookup(session, def).await?;
        cache
            .name_of(id)
            .map(|s| s.to_string())
            .ok_or_else(|| AlanaError::IdNotFound {
                resource: def.key.clone(),
                id,
            })
    }

    /// Drop a cache so the next access refetches it; returns whether one was held
    pub async fn invalidate(&self, key: &str) -> bool {
        let mut caches = self.caches.write().await;
        let dropped = caches.remove(key).is_some();
        if dropped {
            tracing::debug!("{}: lookup invalidated", key);
        }
        dropped
    }

    /// Drop every cache
    pub async fn invalidate_all(&self) {
        let mut caches = self.caches.write().await;
        caches.clear();
    }

    /// Whether a cache is currently held for a key
    pub async fn is_cached(&self, key: &str) -> bool {
        let caches = self.caches.read().await;
        caches.contains_key(key)
    }

    /// Install a prebuilt cache
    pub async fn insert(&self, key: &str, cache: LookupCache) -> Arc<LookupCache> {
        let cache = Arc::new(cache);
        let mut caches = self.caches.write().await;
        caches.insert(key.to_string(), cache.clone());
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_invalidate() {
        tokio_test::block_on(async {
            let registry = Registry::new();
            let records = json!([{"id": 3, "field_name": "Field A"}]);
            registry
                .insert(
                    "fieldmaster",
                    LookupCache::from_records(records.as_array().unwrap(), "field_name"),
                )
                .await;

            assert!(registry.is_cached("fieldmaster").await);
            let cache = registry.cached("fieldmaster").await.unwrap();
            assert_eq!(cache.id_of("Field A"), Some(3));

            assert!(registry.invalidate("fieldmaster").await);
            assert!(!registry.is_cached("fieldmaster").await);
            assert!(!registry.invalidate("fieldmaster").await);
        });
    }

    #[test]
    fn test_clones_share_caches() {
        tokio_test::block_on(async {
            let registry = Registry::new();
            let other = registry.clone();
            registry.insert("wellmaster", LookupCache::empty()).await;
            assert!(other.is_cached("wellmaster").await);

            other.invalidate_all().await;
            assert!(!registry.is_cached("wellmaster").await);
        });
    }

    #[test]
    fn test_reader_keeps_old_cache_across_rebuild() {
        tokio_test::block_on(async {
            let registry = Registry::new();
            let records = json!([{"id": 1, "name": "A"}]);
            let old = registry
                .insert("dcamaster", LookupCache::from_records(records.as_array().unwrap(), "name"))
                .await;

            registry.insert("dcamaster", LookupCache::empty()).await;

            assert_eq!(old.id_of("A"), Some(1));
            assert!(registry.cached("dcamaster").await.unwrap().is_empty());
        });
    }
}
