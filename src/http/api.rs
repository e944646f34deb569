//! Tenant discovery endpoint.
//!
//! Serves the machine-readable tenant listing the shell frontend uses to
//! render the portal chooser. Answered by the gateway itself; it never
//! touches an upstream.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::server::AppState;

/// One entry in the `/api/states` listing.
#[derive(Debug, Serialize)]
pub struct StateEntry {
    /// Tenant slug, as it appears in gateway paths.
    pub slug: String,
    /// Human-readable portal name.
    pub name: String,
    /// Upstream origin the tenant maps to.
    pub url: String,
    /// Gateway path prefix for this tenant.
    pub path: String,
}

/// `GET /api/states`: every registered tenant, in configuration order.
pub async fn list_states(State(state): State<AppState>) -> Json<Vec<StateEntry>> {
    let entries = state
        .registry
        .iter()
        .map(|tenant| StateEntry {
            slug: tenant.slug.clone(),
            name: tenant.display_name.clone(),
            url: tenant.origin_base().to_string(),
            path: format!("/state/{}", tenant.slug),
        })
        .collect();
    Json(entries)
}
