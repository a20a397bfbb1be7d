//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the egress transport builder.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EgressConfig {
    /// Namespaces holding the CA bundle ConfigMaps.
    pub namespaces: NamespaceConfig,

    /// Where the cluster object snapshot is read from.
    pub cluster: ClusterConfig,

    /// Trust bundle selection.
    pub trust: TrustConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Namespace configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Namespace of the operator-managed trusted CA bundle.
    pub managed: String,

    /// Namespace of administrator-supplied CA ConfigMaps.
    pub config: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            managed: "openshift-config-managed".to_string(),
            config: "openshift-config".to_string(),
        }
    }
}

/// Cluster snapshot source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Path to a JSON object list (Proxy and ConfigMap items).
    pub snapshot_path: Option<String>,

    /// Poll interval for the snapshot watcher in seconds.
    pub poll_interval_secs: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            poll_interval_secs: 2,
        }
    }
}

/// Trust bundle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrustConfig {
    /// Name of a CA ConfigMap in the config namespace.
    /// When unset the operator-managed bundle is used.
    pub ca_config_map: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
