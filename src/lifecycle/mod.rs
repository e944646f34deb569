//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build registry and clients → Listen
//!
//! Shutdown (shutdown.rs):
//!     SIGTERM/SIGINT → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then clients, then the listener
//! - Shutdown drains: the listener closes, in-flight requests complete

pub mod shutdown;

pub use shutdown::{listen_for_signals, Shutdown};
