//! Egress transport subsystem.
//!
//! # Data Flow
//! ```text
//! Cluster caches (Proxy, ConfigMaps)
//!     → proxy.rs (cluster proxy policy → ProxyFunc)
//!     → trust.rs (CA bundle ConfigMap → RootTrustStore)
//!     → transport.rs (assemble TransportConfig, proxy first)
//!     → Consumer: reqwest::ClientBuilder / rustls::ClientConfig
//! ```
//!
//! # Design Decisions
//! - Absence is not an error: resolvers return `Ok(None)` for missing objects
//! - Cache faults are returned unchanged, never retried here
//! - Nothing in this module logs; callers decide what to report
//! - Pure functions over read-only caches, safe to call concurrently

pub mod error;
pub mod no_proxy;
pub mod proxy;
pub mod transport;
pub mod trust;
pub mod user_agent;

pub use error::{TransportError, TransportResult, NIL_REQUEST};
pub use no_proxy::NoProxy;
pub use proxy::{resolve_proxy_policy, ProxyConfig, ProxyFunc, CLUSTER_PROXY_NAME};
pub use transport::{EgressResolver, ProxyRoute, TransportConfig, TransportOutcome};
pub use trust::{
    load_trust_bundle, BundleLocation, RootTrustStore, TrustBundleSource, MANAGED_BUNDLE_KEY,
    MANAGED_BUNDLE_NAME, NAMED_BUNDLE_KEY,
};
pub use user_agent::{user_agent, PRODUCT_TOKEN};
