//! Transport assembly.
//!
//! # Data Flow
//! ```text
//! Proxy cache ──→ resolve_proxy_policy ──→ ProxyFunc ─────┐
//!                                                          ├──→ TransportConfig
//! ConfigMap caches ──→ resolve_trust_bundle ──→ RootTrustStore ┘
//! ```
//!
//! # Design Decisions
//! - Proxy first, trust second; the first error stops assembly
//! - Assembly always yields a transport. On error it holds whatever was built
//!   before the failure and must not carry real traffic
//! - No logging and no retries here; the caller's refresh loop owns both

use std::fmt;
use std::sync::Arc;

use hyper::Request;
use url::Url;

use crate::cluster::{ClusterCaches, ClusterProxy, ConfigMap, Lister};
use crate::config::NamespaceConfig;
use crate::egress::error::{TransportError, TransportResult};
use crate::egress::proxy::{resolve_proxy_policy, ProxyConfig, ProxyFunc};
use crate::egress::trust::{load_trust_bundle, RootTrustStore, TrustBundleSource};
use crate::egress::user_agent::user_agent;

/// Proxy and trust settings for an outbound HTTP transport.
///
/// An unset proxy function leaves proxy selection to the client's environment
/// defaults; an unset trust store leaves the system roots in place.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    proxy: Option<ProxyFunc>,
    root_trust: Option<RootTrustStore>,
}

impl TransportConfig {
    pub fn proxy(&self) -> Option<&ProxyFunc> {
        self.proxy.as_ref()
    }

    pub fn root_trust(&self) -> Option<&RootTrustStore> {
        self.root_trust.as_ref()
    }

    /// Proxy for `request` under this transport, or `Ok(None)` to connect directly.
    pub fn proxy_for<B>(&self, request: Option<&Request<B>>) -> TransportResult<Option<Url>> {
        match &self.proxy {
            Some(proxy) => proxy.proxy_for(request),
            None => request.map(|_| None).ok_or_else(TransportError::nil_request),
        }
    }

    /// Explicit proxy for `target`, if a proxy function is set and selects one.
    pub fn proxy_for_url(&self, target: &Url) -> Option<Url> {
        self.proxy.as_ref().and_then(|p| p.proxy_for_url(target))
    }

    /// How a client built from this transport reaches `target`.
    pub fn route_for(&self, target: &Url) -> ProxyRoute {
        match &self.proxy {
            Some(proxy) => proxy
                .proxy_for_url(target)
                .map_or(ProxyRoute::Direct, ProxyRoute::Proxy),
            None => ProxyRoute::Environment,
        }
    }

    /// A `reqwest` client builder carrying this transport's settings and the user agent.
    pub fn client_builder(&self) -> TransportResult<reqwest::ClientBuilder> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent());

        if let Some(proxy) = self.proxy.clone() {
            builder = builder.proxy(reqwest::Proxy::custom(move |url: &Url| {
                proxy.proxy_for_url(url)
            }));
        }

        if let Some(trust) = &self.root_trust {
            builder = builder.tls_built_in_root_certs(false);
            for der in trust.certificates() {
                builder = builder.add_root_certificate(reqwest::Certificate::from_der(der)?);
            }
        }

        Ok(builder)
    }
}

/// Proxy decision for a single destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRoute {
    /// Send through this proxy.
    Proxy(Url),
    /// The cluster policy selects no proxy.
    Direct,
    /// No cluster policy; the client's environment proxy settings apply.
    Environment,
}

impl fmt::Display for ProxyRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyRoute::Proxy(url) => write!(f, "{url}"),
            ProxyRoute::Direct => f.write_str("DIRECT"),
            ProxyRoute::Environment => f.write_str("ENVIRONMENT"),
        }
    }
}

/// Result of [`EgressResolver::build_transport`].
///
/// Unlike a plain `Result`, the transport is returned on failure too, holding
/// the settings resolved before the error. Treat any transport paired with an
/// error as unusable for real traffic.
#[derive(Debug)]
#[must_use]
pub struct TransportOutcome {
    pub transport: TransportConfig,
    pub error: Option<TransportError>,
}

impl TransportOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Conventional `Result`, discarding the partial transport on error.
    pub fn into_result(self) -> TransportResult<TransportConfig> {
        match self.error {
            None => Ok(self.transport),
            Some(e) => Err(e),
        }
    }

    pub fn into_parts(self) -> (TransportConfig, Option<TransportError>) {
        (self.transport, self.error)
    }
}

/// Derives transport configuration from cached cluster objects.
///
/// Holds no mutable state; concurrent calls are independent.
#[derive(Clone)]
pub struct EgressResolver {
    proxies: Arc<dyn Lister<ClusterProxy>>,
    managed_config_maps: Arc<dyn Lister<ConfigMap>>,
    config_maps: Arc<dyn Lister<ConfigMap>>,
    namespaces: NamespaceConfig,
}

impl EgressResolver {
    pub fn new(
        proxies: Arc<dyn Lister<ClusterProxy>>,
        managed_config_maps: Arc<dyn Lister<ConfigMap>>,
        config_maps: Arc<dyn Lister<ConfigMap>>,
        namespaces: NamespaceConfig,
    ) -> Self {
        Self {
            proxies,
            managed_config_maps,
            config_maps,
            namespaces,
        }
    }

    /// Resolver over the in-memory cluster caches.
    pub fn from_caches(caches: &ClusterCaches, namespaces: NamespaceConfig) -> Self {
        Self::new(
            caches.proxies.clone(),
            caches.managed_config_maps.clone(),
            caches.config_maps.clone(),
            namespaces,
        )
    }

    pub fn namespaces(&self) -> &NamespaceConfig {
        &self.namespaces
    }

    /// Cluster proxy policy, or `None` when no proxy object exists.
    pub fn resolve_proxy_policy(&self) -> TransportResult<Option<ProxyConfig>> {
        resolve_proxy_policy(self.proxies.as_ref())
    }

    /// Trust store for `source`, or `None` to keep the system roots.
    pub fn resolve_trust_bundle(
        &self,
        source: &TrustBundleSource,
    ) -> TransportResult<Option<RootTrustStore>> {
        let config_maps = match source {
            TrustBundleSource::Managed => &self.managed_config_maps,
            TrustBundleSource::Named(_) => &self.config_maps,
        };
        load_trust_bundle(config_maps.as_ref(), &source.locate(&self.namespaces))
    }

    /// Assemble a transport configuration.
    pub fn build_transport(&self, source: &TrustBundleSource) -> TransportOutcome {
        let mut transport = TransportConfig::default();

        match self.resolve_proxy_policy() {
            Ok(Some(policy)) => transport.proxy = Some(policy.proxy_func()),
            Ok(None) => {}
            Err(e) => return TransportOutcome::failed(transport, e),
        }

        match self.resolve_trust_bundle(source) {
            Ok(Some(store)) => transport.root_trust = Some(store),
            Ok(None) => {}
            Err(e) => return TransportOutcome::failed(transport, e),
        }

        TransportOutcome {
            transport,
            error: None,
        }
    }
}

impl TransportOutcome {
    fn failed(transport: TransportConfig, error: TransportError) -> Self {
        Self {
            transport,
            error: Some(error),
        }
    }
}
