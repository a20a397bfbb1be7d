//! Cluster object model and local caches.
//!
//! # Data Flow
//! ```text
//! Snapshot file (JSON List)
//!     → watcher.rs (file change → reload)
//!     → snapshot.rs (parse, route by kind and namespace)
//!     → cache.rs (ResourceCache per object set)
//!     → lister.rs (read-only Lister<T> handed to resolvers)
//! ```
//!
//! # Design Decisions
//! - Caches are written by one loader and read concurrently by resolvers
//! - Reads fail until the first full load, like an informer before sync
//! - Objects outside a cache's namespace are dropped, not stored

pub mod cache;
pub mod lister;
pub mod objects;
pub mod snapshot;
pub mod watcher;

pub use cache::{ClusterCaches, ResourceCache};
pub use lister::{Lister, LookupError};
pub use objects::{
    ClusterProxy, ConfigMap, ConfigMapReference, ObjectMeta, ProxySpec, ProxyStatus, Resource,
};
pub use snapshot::{
    load_snapshot, parse_snapshot, AppliedCounts, ClusterObject, ClusterSnapshot, SnapshotError,
};
pub use watcher::SnapshotWatcher;
