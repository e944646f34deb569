//! Response rewriting for prefix-relative addressing.
//!
//! # Responsibilities
//! - Rewrite redirect Location values so navigation stays under `/state/{slug}`
//! - Re-scope Set-Cookie values to the gateway host
//! - Strip framing restrictions when embedding is allowed
//!
//! # Design Decisions
//! - Rewriting is idempotent: values already carrying the gateway prefix
//!   are never prefixed again
//! - Redirects to third-party origins pass through untouched
//! - Bodies are never inspected or modified

use axum::http::header::{CONTENT_SECURITY_POLICY, LOCATION, SET_COOKIE, X_FRAME_OPTIONS};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use url::Url;

use crate::registry::Tenant;

/// Deployment policy switches applied to upstream responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewritePolicy {
    /// Remove X-Frame-Options and CSP frame-ancestors so portal pages can
    /// be embedded by the shell frontend.
    pub allow_framing: bool,
}

/// Rewrite an upstream response's headers in place.
///
/// Runs after the response head arrives and before any body byte is
/// relayed. Headers the rewriter does not recognize are left untouched.
pub fn rewrite_response(
    status: StatusCode,
    headers: &mut HeaderMap,
    tenant: &Tenant,
    policy: RewritePolicy,
) {
    if status.is_redirection() {
        let rewritten = headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| rewrite_location(location, &tenant.slug, &tenant.origin));
        if let Some(location) = rewritten {
            if let Ok(value) = HeaderValue::from_str(&location) {
                headers.insert(LOCATION, value);
            }
        }
    }

    if headers.contains_key(SET_COOKIE) {
        let rewritten: Vec<HeaderValue> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| match value.to_str() {
                Ok(cookie) => HeaderValue::from_str(&rewrite_set_cookie(cookie))
                    .unwrap_or_else(|_| value.clone()),
                // opaque bytes: leave the cookie alone
                Err(_) => value.clone(),
            })
            .collect();
        headers.remove(SET_COOKIE);
        for value in rewritten {
            headers.append(SET_COOKIE, value);
        }
    }

    if policy.allow_framing {
        headers.remove(X_FRAME_OPTIONS);
        let stripped = headers
            .get(CONTENT_SECURITY_POLICY)
            .and_then(|value| value.to_str().ok())
            .and_then(strip_frame_ancestors);
        match stripped {
            Some(csp) if csp.is_empty() => {
                headers.remove(CONTENT_SECURITY_POLICY);
            }
            Some(csp) => {
                if let Ok(value) = HeaderValue::from_str(&csp) {
                    headers.insert(CONTENT_SECURITY_POLICY, value);
                }
            }
            None => {}
        }
    }
}

/// Compute the client-visible Location for a redirect issued by a tenant
/// upstream. Returns `None` when the value should pass through unchanged.
///
/// Origin-relative values gain the tenant prefix. Absolute values pointing
/// back at the tenant's own origin are folded onto the prefix; everything
/// else (third parties, protocol-relative references) is untouched.
pub fn rewrite_location(location: &str, slug: &str, origin: &Url) -> Option<String> {
    if location.starts_with('/') && !location.starts_with("//") {
        if has_gateway_prefix(location, slug) {
            return None;
        }
        return Some(format!("/state/{slug}{location}"));
    }

    if let Ok(absolute) = Url::parse(location) {
        if absolute.origin() == origin.origin() {
            let mut suffix = absolute.path().to_string();
            if let Some(query) = absolute.query() {
                suffix.push('?');
                suffix.push_str(query);
            }
            if let Some(fragment) = absolute.fragment() {
                suffix.push('#');
                suffix.push_str(fragment);
            }
            if has_gateway_prefix(&suffix, slug) {
                return Some(suffix);
            }
            return Some(format!("/state/{slug}{suffix}"));
        }
    }

    None
}

/// True when `path` already addresses this tenant through the gateway.
fn has_gateway_prefix(path: &str, slug: &str) -> bool {
    let Some(rest) = path.strip_prefix("/state/") else {
        return false;
    };
    let Some(tail) = rest.strip_prefix(slug) else {
        return false;
    };
    tail.is_empty() || tail.starts_with('/') || tail.starts_with('?') || tail.starts_with('#')
}

/// Re-scope a Set-Cookie value to the gateway host.
///
/// Drops any Domain attribute (the cookie must bind to the gateway host,
/// not the upstream's) and forces `Path=/` when no Path is present, so the
/// cookie still flows on requests outside the tenant prefix.
pub fn rewrite_set_cookie(cookie: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut has_path = false;

    for (index, part) in cookie.split(';').enumerate() {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        // index 0 is the name=value pair and is always kept
        if index > 0 {
            let attribute = trimmed
                .split('=')
                .next()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase();
            if attribute == "domain" {
                continue;
            }
            if attribute == "path" {
                has_path = true;
            }
        }
        parts.push(trimmed);
    }

    let mut rewritten = parts.join("; ");
    if !has_path {
        if rewritten.is_empty() {
            rewritten.push_str("Path=/");
        } else {
            rewritten.push_str("; Path=/");
        }
    }
    rewritten
}

/// Drop the frame-ancestors directive from a CSP value.
///
/// Returns `None` when the directive is absent (the header is left alone),
/// otherwise the remaining directives. An empty result means the whole
/// header should be removed.
pub fn strip_frame_ancestors(csp: &str) -> Option<String> {
    let mut found = false;
    let kept: Vec<&str> = csp
        .split(';')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .filter(|directive| {
            let is_frame_ancestors = directive
                .split_whitespace()
                .next()
                .is_some_and(|name| name.eq_ignore_ascii_case("frame-ancestors"));
            if is_frame_ancestors {
                found = true;
            }
            !is_frame_ancestors
        })
        .collect();

    if found {
        Some(kept.join("; "))
    } else {
        None
    }
}
