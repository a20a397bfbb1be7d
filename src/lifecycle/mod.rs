//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed loop finishes its current refresh → exit
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; loops subscribe before they start
//! - A refresh in progress is never interrupted, the loop exits after it

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_on_signal;
