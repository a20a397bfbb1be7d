//! In-memory object caches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::cluster::lister::{Lister, LookupError};
use crate::cluster::objects::{ClusterProxy, ConfigMap, Resource};
use crate::config::schema::NamespaceConfig;

/// A thread-safe object cache keyed by name.
///
/// A namespaced cache only accepts objects from its own namespace. Reads fail
/// with [`LookupError::NotSynced`] until [`mark_synced`](Self::mark_synced) is
/// called, mirroring an informer that has not finished its initial list.
pub struct ResourceCache<T> {
    inner: DashMap<String, Arc<T>>,
    namespace: Option<String>,
    synced: AtomicBool,
}

impl<T: Resource> ResourceCache<T> {
    /// Cache for cluster-scoped objects.
    pub fn cluster_scoped() -> Self {
        Self::with_scope(None)
    }

    /// Cache for objects in a single namespace.
    pub fn namespaced(namespace: impl Into<String>) -> Self {
        Self::with_scope(Some(namespace.into()))
    }

    fn with_scope(namespace: Option<String>) -> Self {
        Self {
            inner: DashMap::new(),
            namespace,
            synced: AtomicBool::new(false),
        }
    }

    /// Namespace this cache is scoped to.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether `object` belongs in this cache.
    pub fn accepts(&self, object: &T) -> bool {
        match &self.namespace {
            Some(ns) => object.metadata().namespace == *ns,
            None => object.metadata().namespace.is_empty(),
        }
    }

    /// Insert or replace an object. Returns false if the object is out of scope.
    pub fn apply(&self, object: T) -> bool {
        if !self.accepts(&object) {
            return false;
        }
        let name = object.metadata().name.clone();
        self.inner.insert(name, Arc::new(object));
        true
    }

    /// Remove an object by name, returning it if it was cached.
    pub fn delete(&self, name: &str) -> Option<Arc<T>> {
        self.inner.remove(name).map(|(_, object)| object)
    }

    /// Replace the cache contents with `objects` and mark the cache synced.
    ///
    /// Out-of-scope objects are skipped. Returns the number of objects kept.
    pub fn replace_all<I>(&self, objects: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let fresh: Vec<T> = objects.into_iter().filter(|o| self.accepts(o)).collect();
        self.inner
            .retain(|name, _| fresh.iter().any(|o| o.metadata().name == *name));
        let kept = fresh.len();
        for object in fresh {
            self.inner
                .insert(object.metadata().name.clone(), Arc::new(object));
        }
        self.mark_synced();
        kept
    }

    pub fn mark_synced(&self) {
        self.synced.store(true, Ordering::Release);
    }

    pub fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Resource> Lister<T> for ResourceCache<T> {
    fn get(&self, name: &str) -> Result<Arc<T>, LookupError> {
        if !self.has_synced() {
            return Err(LookupError::NotSynced { kind: T::KIND });
        }
        self.inner
            .get(name)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| LookupError::NotFound {
                kind: T::KIND,
                name: name.to_string(),
            })
    }
}

/// The caches the egress resolvers read from.
#[derive(Clone)]
pub struct ClusterCaches {
    pub proxies: Arc<ResourceCache<ClusterProxy>>,
    /// ConfigMaps in the operator-managed namespace.
    pub managed_config_maps: Arc<ResourceCache<ConfigMap>>,
    /// ConfigMaps in the administrator config namespace.
    pub config_maps: Arc<ResourceCache<ConfigMap>>,
}

impl ClusterCaches {
    pub fn new(namespaces: &NamespaceConfig) -> Self {
        Self {
            proxies: Arc::new(ResourceCache::cluster_scoped()),
            managed_config_maps: Arc::new(ResourceCache::namespaced(&namespaces.managed)),
            config_maps: Arc::new(ResourceCache::namespaced(&namespaces.config)),
        }
    }

    /// Mark every cache synced, e.g. after seeding them by hand.
    pub fn mark_synced(&self) {
        self.proxies.mark_synced();
        self.managed_config_maps.mark_synced();
        self.config_maps.mark_synced();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_before_sync_fails() {
        let cache = ResourceCache::<ClusterProxy>::cluster_scoped();
        cache.apply(ClusterProxy::with_status("cluster", "", "", ""));

        let err = cache.get("cluster").unwrap_err();
        assert_eq!(err, LookupError::NotSynced { kind: "Proxy" });

        cache.mark_synced();
        assert!(cache.get("cluster").is_ok());
    }

    #[test]
    fn test_missing_object_is_not_found() {
        let cache = ResourceCache::<ConfigMap>::namespaced("openshift-config");
        cache.mark_synced();

        let err = cache.get("absent").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_namespace_scope_enforced() {
        let cache = ResourceCache::<ConfigMap>::namespaced("openshift-config");
        assert!(!cache.apply(ConfigMap::new("default", "my-ca")));
        assert!(cache.apply(ConfigMap::new("openshift-config", "my-ca")));
        assert_eq!(cache.len(), 1);

        let proxies = ResourceCache::<ClusterProxy>::cluster_scoped();
        let mut namespaced = ClusterProxy::with_status("cluster", "", "", "");
        namespaced.metadata.namespace = "default".into();
        assert!(!proxies.apply(namespaced));
    }

    #[test]
    fn test_replace_all_drops_stale_objects() {
        let cache = ResourceCache::<ConfigMap>::namespaced("ns");
        cache.apply(ConfigMap::new("ns", "old"));
        cache.apply(ConfigMap::new("ns", "kept"));

        let kept = cache.replace_all(vec![
            ConfigMap::new("ns", "kept").with_entry("k", "v2"),
            ConfigMap::new("ns", "new"),
            ConfigMap::new("other", "ignored"),
        ]);

        assert_eq!(kept, 2);
        assert!(cache.has_synced());
        assert!(cache.get("old").unwrap_err().is_not_found());
        assert_eq!(cache.get("kept").unwrap().get("k"), Some("v2"));
        assert!(cache.get("new").is_ok());
    }

    #[test]
    fn test_delete() {
        let cache = ResourceCache::<ConfigMap>::namespaced("ns");
        cache.mark_synced();
        cache.apply(ConfigMap::new("ns", "a"));
        assert!(cache.delete("a").is_some());
        assert!(cache.delete("a").is_none());
        assert!(cache.is_empty());
    }
}
