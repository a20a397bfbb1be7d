//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EgressConfig (validated, immutable)
//!     → namespaces feed ClusterCaches, trust feeds TrustBundleSource
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal (or absent) config files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ClusterConfig;
pub use schema::EgressConfig;
pub use schema::NamespaceConfig;
pub use schema::ObservabilityConfig;
pub use schema::TrustConfig;
