//! Multi-tenant path-prefixed reverse-proxy gateway.
//!
//! A single public entry point routes `/state/{slug}/...` to per-tenant
//! upstream origins, rewriting redirects, cookies and framing headers so
//! upstream applications keep working behind the foreign path prefix.
//!
//! ```text
//! client ──▶ routing (prefix match, strip) ──▶ proxy (forward) ──▶ upstream
//!    ▲                                            │
//!    └────────── proxy (rewrite) ◀── response ◀───┘
//!
//! reserved paths (/, /api/*, assets) ──▶ frontend collaborator
//! unscoped application paths ──▶ 302 to /
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod registry;
pub mod routing;

pub use config::{load_config, GatewayConfig};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use registry::TenantRegistry;
