//! Branded gateway error pages.
//!
//! One template covers every user-visible failure. Pages name the tenant
//! when one was resolved, link back to the portal chooser, and never
//! expose upstream hostnames or internal error detail.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// 502 page for a failed tenant upstream.
pub fn bad_gateway(display_name: &str) -> Response {
    let heading = format!("{display_name} portal unavailable");
    let message = format!(
        "The {display_name} portal is not responding right now. Please try again in a moment."
    );
    page(StatusCode::BAD_GATEWAY, &heading, &message)
}

/// 502 page for a failure on a non-tenant route.
pub fn service_unavailable() -> Response {
    page(
        StatusCode::BAD_GATEWAY,
        "Service unavailable",
        "The service is not responding right now. Please try again in a moment.",
    )
}

/// 404 page for a well-formed but unknown tenant slug.
pub fn unknown_tenant() -> Response {
    page(
        StatusCode::NOT_FOUND,
        "Portal not found",
        "There is no state portal at this address.",
    )
}

fn page(status: StatusCode, heading: &str, message: &str) -> Response {
    (status, Html(render(status, heading, message))).into_response()
}

fn render(status: StatusCode, heading: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{code} | {heading}</title>
<style>
  body {{
    margin: 0;
    font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
    background: #f0fdf4;
    color: #14532d;
    display: flex;
    min-height: 100vh;
    align-items: center;
    justify-content: center;
  }}
  .card {{
    text-align: center;
    padding: 3rem 2.5rem;
    background: #ffffff;
    border-radius: 12px;
    box-shadow: 0 10px 30px rgba(20, 83, 45, 0.08);
    max-width: 28rem;
  }}
  .badge {{
    font-size: 0.85rem;
    letter-spacing: 0.1em;
    color: #65a30d;
  }}
  h1 {{
    margin: 0.75rem 0 0.25rem;
    font-size: 1.5rem;
  }}
  p {{
    margin: 0.5rem 0 1.5rem;
    color: #3f6212;
  }}
  a {{
    display: inline-block;
    padding: 0.6rem 1.4rem;
    background: #16a34a;
    color: #ffffff;
    border-radius: 8px;
    text-decoration: none;
  }}
</style>
</head>
<body>
<div class="card">
  <div class="badge">{code}</div>
  <h1>{heading}</h1>
  <p>{message}</p>
  <a href="/">Choose a state</a>
</div>
</body>
</html>
"#,
        code = status.as_u16(),
    )
}
