//! Cluster resource definitions.
//!
//! Only the fields the egress layer reads are modelled. Field names follow the
//! cluster API's camelCase JSON so snapshots can be fed straight from
//! `kubectl get -o json` style output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity of a cluster object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,

    /// Empty for cluster-scoped objects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl ObjectMeta {
    pub fn cluster_scoped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Implemented by every object a [`ResourceCache`](super::ResourceCache) can hold.
pub trait Resource: Send + Sync + 'static {
    /// Kind name used in lookup errors and snapshot tags.
    const KIND: &'static str;

    fn metadata(&self) -> &ObjectMeta;
}

/// The cluster-wide proxy policy object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProxy {
    pub metadata: ObjectMeta,

    /// Desired configuration as written by administrators.
    #[serde(default)]
    pub spec: ProxySpec,

    /// Configuration as observed and normalised by the network operator.
    #[serde(default)]
    pub status: ProxyStatus,
}

/// Administrator-supplied proxy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxySpec {
    pub http_proxy: String,
    pub https_proxy: String,
    pub no_proxy: String,
    pub readiness_endpoints: Vec<String>,
    #[serde(rename = "trustedCA")]
    pub trusted_ca: ConfigMapReference,
}

/// Reference to a ConfigMap by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigMapReference {
    pub name: String,
}

/// Effective proxy settings published by the network operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyStatus {
    pub http_proxy: String,
    pub https_proxy: String,
    pub no_proxy: String,
}

impl ClusterProxy {
    /// Build a proxy object whose status carries the given values.
    pub fn with_status(
        name: impl Into<String>,
        http_proxy: impl Into<String>,
        https_proxy: impl Into<String>,
        no_proxy: impl Into<String>,
    ) -> Self {
        Self {
            metadata: ObjectMeta::cluster_scoped(name),
            spec: ProxySpec::default(),
            status: ProxyStatus {
                http_proxy: http_proxy.into(),
                https_proxy: https_proxy.into(),
                no_proxy: no_proxy.into(),
            },
        }
    }
}

impl Resource for ClusterProxy {
    const KIND: &'static str = "Proxy";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// A namespaced key/value object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigMap {
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl ConfigMap {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::namespaced(namespace, name),
            data: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

impl Resource for ConfigMap {
    const KIND: &'static str = "ConfigMap";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
