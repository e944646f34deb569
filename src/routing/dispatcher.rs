//! Request dispatch: inbound path → route decision.
//!
//! # Responsibilities
//! - Extract and strip the `/state/{slug}` prefix
//! - Recognize reserved frontend paths (API, static assets, build tooling)
//! - Apply the redirect policy for unscoped paths
//!
//! # Design Decisions
//! - Pure function of the path; registry lookup happens in the handler
//! - Reserved paths are an explicit exclusion list, not a heuristic
//! - No regex in hot path (prefix and suffix matching only)
//! - Unscoped application paths never infer a tenant; they redirect home

/// Routing decision for one inbound request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision<'a> {
    /// Forward to the tenant's upstream with the prefix stripped.
    Proxy {
        slug: &'a str,
        upstream_path: &'a str,
    },
    /// Hand the request to the frontend collaborator unchanged.
    Passthrough,
    /// `302` to `/`.
    RedirectHome,
}

/// Build-tool paths the frontend serves regardless of extension.
const INTERNAL_PREFIXES: &[&str] = &["/src/", "/@", "/node_modules/"];

const INTERNAL_EXACT: &[&str] = &["/vite-hmr"];

/// Static asset extensions served by the frontend (matched case-insensitively).
const STATIC_EXTENSIONS: &[&str] = &[
    ".js", ".css", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".woff", ".woff2", ".ttf",
    ".eot", ".json",
];

/// Decide how to handle a request path. Query strings are not part of the
/// decision; callers re-attach them to the stripped path.
pub fn dispatch(path: &str) -> RouteDecision<'_> {
    if let Some(rest) = path.strip_prefix("/state/") {
        let (slug, remainder) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        if !slug.is_empty() {
            let upstream_path = if remainder.is_empty() { "/" } else { remainder };
            return RouteDecision::Proxy {
                slug,
                upstream_path,
            };
        }
        // "/state/" alone carries no tenant context
        return RouteDecision::RedirectHome;
    }
    if path == "/state" {
        return RouteDecision::RedirectHome;
    }

    if path == "/" {
        return RouteDecision::Passthrough;
    }
    if path == "/api" || path.starts_with("/api/") {
        return RouteDecision::Passthrough;
    }
    if is_internal_path(path) || is_static_asset(path) {
        return RouteDecision::Passthrough;
    }

    if path == "/login" {
        // There is no unscoped login; it only exists under a tenant prefix.
        return RouteDecision::RedirectHome;
    }

    RouteDecision::RedirectHome
}

fn is_internal_path(path: &str) -> bool {
    INTERNAL_EXACT.contains(&path)
        || INTERNAL_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn is_static_asset(path: &str) -> bool {
    STATIC_EXTENSIONS
        .iter()
        .any(|ext| ends_with_ignore_case(path, ext))
}

fn ends_with_ignore_case(path: &str, suffix: &str) -> bool {
    let (p, s) = (path.as_bytes(), suffix.as_bytes());
    p.len() >= s.len() && p[p.len() - s.len()..].eq_ignore_ascii_case(s)
}
