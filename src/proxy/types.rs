//! Proxy type definitions.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Failure while forwarding a request to an upstream origin.
///
/// Every variant renders as a tenant-scoped 502; the detail strings go to
/// the structured log, never to the client.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("upstream protocol error: {0}")]
    Protocol(String),
}

impl ProxyError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Timeout(_) => "timeout",
            ProxyError::Unreachable(_) => "unreachable",
            ProxyError::Protocol(_) => "protocol",
        }
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;

/// Per-request forwarding context.
///
/// Pairs with the inbound request (which still carries the original method,
/// headers and body stream). Owned by the handling task and dropped when the
/// response finishes or the client disconnects, which cancels the in-flight
/// upstream call.
#[derive(Debug, Clone)]
pub struct ProxyContext {
    /// Slug of the tenant being proxied.
    pub tenant_slug: String,

    /// Prefix-stripped path plus the original query string.
    pub upstream_path: String,

    /// Address of the connecting client.
    pub client_addr: SocketAddr,
}
