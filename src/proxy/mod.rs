//! Proxy subsystem: upstream forwarding and response rewriting.
//!
//! # Data Flow
//! ```text
//! ProxyContext + Request
//!     → forwarder.rs (URI rebuild, forwarded headers, streaming send)
//!     → upstream origin
//!     → rewrite.rs (Location, Set-Cookie, framing headers)
//!     → client
//!
//! on ProxyError:
//!     → error_page.rs (tenant-scoped 502)
//! ```
//!
//! # Design Decisions
//! - One pooled client per tenant, so pool exhaustion stays tenant-local
//! - Bodies stream through in both directions, never buffered
//! - Failures collapse to a small taxonomy: timeout, unreachable, protocol

pub mod error_page;
pub mod forwarder;
pub mod rewrite;
pub mod tls;
pub mod types;

pub use forwarder::Forwarder;
pub use rewrite::{rewrite_response, RewritePolicy};
pub use types::{ProxyContext, ProxyError, ProxyResult};
