//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce tenant invariants (slug pattern, origin shape, uniqueness)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid listener bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("no tenants configured")]
    NoTenants,

    #[error("tenant slug '{0}' is not a valid path segment (expected ^[a-z0-9-]+$)")]
    InvalidSlug(String),

    #[error("duplicate tenant slug '{0}'")]
    DuplicateSlug(String),

    #[error("tenant '{slug}' has invalid origin '{origin}': {reason}")]
    InvalidOrigin {
        slug: String,
        origin: String,
        reason: String,
    },

    #[error("invalid frontend origin '{origin}': {reason}")]
    InvalidFrontendOrigin { origin: String, reason: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.idle_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("idle_secs"));
    }

    if config.tenants.is_empty() {
        errors.push(ValidationError::NoTenants);
    }

    let mut seen = HashSet::new();
    for tenant in &config.tenants {
        if !is_valid_slug(&tenant.slug) {
            errors.push(ValidationError::InvalidSlug(tenant.slug.clone()));
        }
        if !seen.insert(tenant.slug.as_str()) {
            errors.push(ValidationError::DuplicateSlug(tenant.slug.clone()));
        }
        if let Err(reason) = parse_origin(&tenant.origin) {
            errors.push(ValidationError::InvalidOrigin {
                slug: tenant.slug.clone(),
                origin: tenant.origin.clone(),
                reason,
            });
        }
    }

    if let Err(reason) = parse_origin(&config.frontend.origin) {
        errors.push(ValidationError::InvalidFrontendOrigin {
            origin: config.frontend.origin.clone(),
            reason,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A slug is one non-empty lowercase-kebab path segment.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Parse and check an upstream origin: absolute http(s) URL with a host and
/// no path, query or fragment. Returns the parsed URL on success.
pub fn parse_origin(origin: &str) -> Result<Url, String> {
    let url = Url::parse(origin).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(format!("origin must not carry a path (got '{}')", url.path()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("origin must not carry a query or fragment".to_string());
    }

    Ok(url)
}
