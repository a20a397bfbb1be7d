//! Cluster snapshot loading.
//!
//! A snapshot is a JSON `List` holding the objects the egress layer reads:
//!
//! ```json
//! {
//!   "apiVersion": "v1",
//!   "kind": "List",
//!   "items": [
//!     {"kind": "Proxy", "metadata": {"name": "cluster"}, "status": {"httpProxy": "..."}},
//!     {"kind": "ConfigMap", "metadata": {"name": "trusted-ca-bundle",
//!       "namespace": "openshift-config-managed"}, "data": {"ca-bundle.crt": "..."}}
//!   ]
//! }
//! ```
//!
//! Items of other kinds are skipped.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::cluster::cache::ClusterCaches;
use crate::cluster::objects::{ClusterProxy, ConfigMap};

/// Errors that can occur while loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One item of a snapshot list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind")]
pub enum ClusterObject {
    Proxy(ClusterProxy),
    ConfigMap(ConfigMap),
    #[serde(other)]
    Unsupported,
}

/// Full contents of the cluster objects the caches hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub items: Vec<ClusterObject>,
}

/// Number of objects each cache holds after [`ClusterSnapshot::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedCounts {
    pub proxies: usize,
    pub managed_config_maps: usize,
    pub config_maps: usize,
}

impl ClusterSnapshot {
    pub fn proxies(&self) -> impl Iterator<Item = &ClusterProxy> {
        self.items.iter().filter_map(|item| match item {
            ClusterObject::Proxy(p) => Some(p),
            _ => None,
        })
    }

    pub fn config_maps(&self) -> impl Iterator<Item = &ConfigMap> {
        self.items.iter().filter_map(|item| match item {
            ClusterObject::ConfigMap(cm) => Some(cm),
            _ => None,
        })
    }

    /// Replace the contents of every cache with this snapshot and mark them synced.
    ///
    /// ConfigMaps land in whichever cache owns their namespace; objects in
    /// other namespaces are dropped.
    pub fn apply(&self, caches: &ClusterCaches) -> AppliedCounts {
        AppliedCounts {
            proxies: caches.proxies.replace_all(self.proxies().cloned()),
            managed_config_maps: caches
                .managed_config_maps
                .replace_all(self.config_maps().cloned()),
            config_maps: caches.config_maps.replace_all(self.config_maps().cloned()),
        }
    }
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<ClusterSnapshot, SnapshotError> {
    let content = fs::read_to_string(path)?;
    parse_snapshot(&content)
}

/// Parse a snapshot from JSON text.
pub fn parse_snapshot(content: &str) -> Result<ClusterSnapshot, SnapshotError> {
    Ok(serde_json::from_str(content)?)
}
