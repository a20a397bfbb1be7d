//! Transport refresh loop.
//!
//! # Responsibilities
//! - Apply cluster snapshots to the caches
//! - Rebuild the transport after every change
//! - Publish the last good transport for HTTP clients to pick up
//!
//! # Design Decisions
//! - A failed rebuild never replaces a good transport
//! - Errors are logged here and returned; the next snapshot retries
//! - Readers never block: the transport is swapped atomically

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::{broadcast, mpsc};

use crate::cluster::{ClusterCaches, ClusterSnapshot};
use crate::config::NamespaceConfig;
use crate::egress::{EgressResolver, TransportConfig, TransportResult, TrustBundleSource};

/// Read side of the published transport.
#[derive(Clone, Default)]
pub struct TransportHandle {
    inner: Arc<ArcSwapOption<TransportConfig>>,
}

impl TransportHandle {
    /// The last transport built without error, if any.
    pub fn current(&self) -> Option<Arc<TransportConfig>> {
        self.inner.load_full()
    }

    fn publish(&self, transport: Arc<TransportConfig>) {
        self.inner.store(Some(transport));
    }
}

/// Keeps a transport configuration in step with the cluster caches.
pub struct EgressController {
    caches: ClusterCaches,
    resolver: EgressResolver,
    source: TrustBundleSource,
    handle: TransportHandle,
}

impl EgressController {
    pub fn new(caches: ClusterCaches, namespaces: NamespaceConfig, source: TrustBundleSource) -> Self {
        let resolver = EgressResolver::from_caches(&caches, namespaces);
        Self {
            caches,
            resolver,
            source,
            handle: TransportHandle::default(),
        }
    }

    pub fn handle(&self) -> TransportHandle {
        self.handle.clone()
    }

    pub fn caches(&self) -> &ClusterCaches {
        &self.caches
    }

    pub fn resolver(&self) -> &EgressResolver {
        &self.resolver
    }

    /// Rebuild the transport from the current cache contents.
    ///
    /// On success the new transport is published. On failure the previously
    /// published transport stays in place and the error is returned.
    pub fn refresh(&self) -> TransportResult<Arc<TransportConfig>> {
        let outcome = self.resolver.build_transport(&self.source);

        match outcome.into_result() {
            Ok(transport) => {
                tracing::info!(
                    source = %self.source,
                    proxy = transport.proxy().is_some(),
                    trusted_certificates = transport.root_trust().map_or(0, |t| t.len()),
                    "Transport refreshed"
                );
                let transport = Arc::new(transport);
                self.handle.publish(Arc::clone(&transport));
                Ok(transport)
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.source,
                    error = %e,
                    retryable = e.is_lookup(),
                    "Transport refresh failed. Keeping current transport."
                );
                Err(e)
            }
        }
    }

    /// Load `snapshot` into the caches and refresh.
    pub fn apply_snapshot(&self, snapshot: &ClusterSnapshot) -> TransportResult<Arc<TransportConfig>> {
        let counts = snapshot.apply(&self.caches);
        tracing::debug!(
            proxies = counts.proxies,
            managed_config_maps = counts.managed_config_maps,
            config_maps = counts.config_maps,
            "Snapshot applied"
        );
        self.refresh()
    }

    /// Refresh on every snapshot until shutdown or until the sender goes away.
    pub async fn run(
        self,
        mut updates: mpsc::UnboundedReceiver<ClusterSnapshot>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(source = %self.source, "Egress controller starting");

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(snapshot) => {
                        // Failures are logged by refresh; the next snapshot retries.
                        let _ = self.apply_snapshot(&snapshot);
                    }
                    None => {
                        tracing::info!("Snapshot stream closed, exiting loop");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Egress controller received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterProxy, ConfigMap, parse_snapshot};
    use crate::egress::TransportError;
    use crate::lifecycle::Shutdown;

    const CA_PEM: &str = include_str!("../tests/fixtures/ca.pem");

    fn controller(source: TrustBundleSource) -> EgressController {
        let namespaces = NamespaceConfig::default();
        EgressController::new(ClusterCaches::new(&namespaces), namespaces, source)
    }

    #[test]
    fn test_refresh_before_sync_publishes_nothing() {
        let controller = controller(TrustBundleSource::Managed);
        assert!(controller.refresh().unwrap_err().is_lookup());
        assert!(controller.handle().current().is_none());
    }

    #[test]
    fn test_failed_refresh_keeps_previous_transport() {
        let controller = controller(TrustBundleSource::Named("my-ca".into()));
        let caches = controller.caches().clone();
        caches.mark_synced();
        caches
            .proxies
            .apply(ClusterProxy::with_status("cluster", "http://proxy.example:8080", "", ""));
        caches
            .config_maps
            .apply(ConfigMap::new("openshift-config", "my-ca").with_entry("ca.crt", CA_PEM));

        let good = controller.refresh().unwrap();
        assert_eq!(good.root_trust().unwrap().len(), 1);

        caches
            .config_maps
            .apply(ConfigMap::new("openshift-config", "my-ca").with_entry("ca.crt", "garbage"));
        assert!(matches!(
            controller.refresh(),
            Err(TransportError::Configuration { .. })
        ));

        let current = controller.handle().current().unwrap();
        assert!(Arc::ptr_eq(&current, &good));
    }

    #[tokio::test]
    async fn test_run_applies_snapshots_until_shutdown() {
        let controller = controller(TrustBundleSource::Managed);
        let handle = controller.handle();
        let shutdown = Shutdown::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(controller.run(rx, shutdown.subscribe()));

        let snapshot = parse_snapshot(
            r#"{"items": [{"kind": "Proxy", "metadata": {"name": "cluster"},
                "status": {"httpsProxy": "http://proxy.example:3128"}}]}"#,
        )
        .unwrap();
        tx.send(snapshot).unwrap();

        let published = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                if let Some(t) = handle.current() {
                    return t;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert!(published.proxy().unwrap().https_proxy().is_some());

        shutdown.trigger();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_exits_when_updates_close() {
        let controller = controller(TrustBundleSource::Managed);
        let shutdown = Shutdown::new();
        let (tx, rx) = mpsc::unbounded_channel::<ClusterSnapshot>();
        drop(tx);

        controller.run(rx, shutdown.subscribe()).await;
    }
}
