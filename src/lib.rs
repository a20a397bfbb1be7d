//! Cluster egress transport configuration.
//!
//! Derives the proxy policy and CA trust settings outbound HTTP clients must
//! use from cached cluster objects, and keeps them current as the cluster
//! changes.
//!
//! # Architecture Overview
//!
//! ```text
//!   snapshot file ──▶ cluster::SnapshotWatcher ──▶ EgressController
//!                                                      │
//!                                    cluster::ClusterCaches (Proxy, ConfigMaps)
//!                                                      │
//!                                                      ▼
//!                                          egress::EgressResolver
//!                                    proxy policy ──┬── trust bundle
//!                                                   ▼
//!                                          egress::TransportConfig
//!                                                   │
//!                                    TransportHandle (last good transport)
//!                                                   ▼
//!                                      reqwest / rustls HTTP clients
//! ```

// Core subsystems
pub mod cluster;
pub mod config;
pub mod controller;
pub mod egress;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::EgressConfig;
pub use controller::{EgressController, TransportHandle};
pub use egress::{EgressResolver, TransportConfig, TransportError, TransportOutcome, TrustBundleSource};
pub use lifecycle::Shutdown;
