//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → dispatcher.rs (prefix extraction, reserved-path table)
//!     → Return: Proxy {slug, stripped path} | Passthrough | RedirectHome
//!
//! The handler then resolves the slug against the tenant registry;
//! an unknown slug becomes a 404 without contacting any upstream.
//! ```
//!
//! # Design Decisions
//! - Decisions compiled from constants, immutable at runtime
//! - No regex in hot path (prefix/suffix matching only)
//! - Deterministic: same path always yields the same decision

pub mod dispatcher;

pub use dispatcher::{dispatch, RouteDecision};
