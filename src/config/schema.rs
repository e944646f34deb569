//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the state gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Tenant definitions mapping slugs to upstream origins.
    pub tenants: Vec<TenantConfig>,

    /// Frontend collaborator serving `/`, `/api/*` and static assets.
    pub frontend: FrontendConfig,

    /// Timeout configuration for upstream dials.
    pub timeouts: TimeoutConfig,

    /// TLS policy toward upstream origins.
    pub upstream_tls: UpstreamTlsConfig,

    /// Framing/embedding policy applied to upstream responses.
    pub embedding: EmbeddingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// One tenant entry: a slug routed to an upstream origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TenantConfig {
    /// Unique lowercase-kebab slug, one URL path segment (`^[a-z0-9-]+$`).
    pub slug: String,

    /// Human-readable name shown on error pages. Derived from the slug
    /// when omitted (split on `-`, capitalize each word).
    #[serde(default)]
    pub display_name: Option<String>,

    /// Upstream origin URL: scheme and host only, no path.
    pub origin: String,
}

/// Frontend collaborator configuration.
///
/// Reserved paths (`/`, `/api/*`, static assets, build-tool internals) are
/// passed through to this origin unchanged.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Origin of the frontend application.
    pub origin: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:5000".to_string(),
        }
    }
}

/// Timeout configuration for upstream requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Idle budget in seconds: request send through response headers, and
    /// each inter-chunk gap of the response body.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            idle_secs: 300,
        }
    }
}

/// TLS verification policy for upstream origins.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamTlsConfig {
    /// Verify upstream certificates against system roots. Disabling accepts
    /// any certificate and is logged loudly at startup.
    pub verify: bool,
}

impl Default for UpstreamTlsConfig {
    fn default() -> Self {
        Self { verify: true }
    }
}

/// Embedding policy for tenant content.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Strip `X-Frame-Options` and CSP `frame-ancestors` from upstream
    /// responses so tenant pages can load inside the gateway's frame.
    pub allow_framing: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            allow_framing: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
