//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controller, watcher and CLI emit tracing events
//!     → logging.rs (EnvFilter + fmt layer)
//!     → stderr
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (`source`, `error`, `path`)
//! - `RUST_LOG` overrides the configured level
//! - The egress core emits nothing; its callers log outcomes

pub mod logging;

pub use logging::init_logging;
