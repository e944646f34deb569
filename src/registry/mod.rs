//! Tenant registry: the immutable slug → upstream mapping.
//!
//! # Responsibilities
//! - Hold one entry per tenant, built once from config at startup
//! - Resolve a slug to its tenant in O(1)
//! - Preserve configuration order for the discovery endpoint
//!
//! # Design Decisions
//! - No interior mutability: startup builds it, request handling only reads it
//! - Construction re-checks tenant invariants so a registry can never exist
//!   in an inconsistent state, even from an unvalidated config
//! - Display names derived from slugs unless configured

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::config::schema::TenantConfig;
use crate::config::validation::{is_valid_slug, parse_origin, ValidationError};

/// One administrative region, served by its own upstream origin.
#[derive(Debug, Clone)]
pub struct Tenant {
    pub slug: String,
    pub display_name: String,
    pub origin: Url,
}

impl Tenant {
    /// Origin without the trailing slash `Url` normalization adds,
    /// e.g. `https://lagos.example.org`.
    pub fn origin_base(&self) -> &str {
        self.origin.as_str().trim_end_matches('/')
    }

    /// Host (plus port when explicit) for the upstream `Host` header.
    pub fn host_header(&self) -> String {
        let host = self.origin.host_str().unwrap_or_default();
        match self.origin.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

/// Immutable mapping from tenant slug to upstream target.
#[derive(Debug)]
pub struct TenantRegistry {
    by_slug: HashMap<String, Arc<Tenant>>,
    ordered: Vec<Arc<Tenant>>,
}

impl TenantRegistry {
    /// Build the registry from tenant configuration entries.
    pub fn from_config(tenants: &[TenantConfig]) -> Result<Self, ValidationError> {
        let mut by_slug = HashMap::with_capacity(tenants.len());
        let mut ordered = Vec::with_capacity(tenants.len());

        for entry in tenants {
            if !is_valid_slug(&entry.slug) {
                return Err(ValidationError::InvalidSlug(entry.slug.clone()));
            }
            let origin =
                parse_origin(&entry.origin).map_err(|reason| ValidationError::InvalidOrigin {
                    slug: entry.slug.clone(),
                    origin: entry.origin.clone(),
                    reason,
                })?;
            let display_name = entry
                .display_name
                .clone()
                .unwrap_or_else(|| derive_display_name(&entry.slug));

            let tenant = Arc::new(Tenant {
                slug: entry.slug.clone(),
                display_name,
                origin,
            });
            if by_slug.insert(entry.slug.clone(), tenant.clone()).is_some() {
                return Err(ValidationError::DuplicateSlug(entry.slug.clone()));
            }
            ordered.push(tenant);
        }

        Ok(Self { by_slug, ordered })
    }

    /// Look up a tenant by slug.
    pub fn resolve(&self, slug: &str) -> Option<Arc<Tenant>> {
        self.by_slug.get(slug).cloned()
    }

    /// Tenants in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tenant>> {
        self.ordered.iter()
    }

    /// Number of registered tenants.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// De-slugify a tenant slug: split on `-`, capitalize each word.
/// `"akwa-ibom"` becomes `"Akwa Ibom"`.
pub fn derive_display_name(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
