//! Request forwarding to upstream origins.
//!
//! # Responsibilities
//! - Maintain one pooled HTTP client per tenant, plus one for the frontend
//! - Rebuild each request for its upstream (URI, Host, forwarded headers)
//! - Stream request and response bodies without buffering
//! - Enforce the connect and idle budgets and classify failures
//!
//! # Design Decisions
//! - Clients are built once at startup from the registry; a stalled
//!   upstream only ties up requests addressed to that tenant
//! - No retries: proxied requests are not known to be idempotent
//! - The response body carries its own idle timer; a mid-stream stall
//!   surfaces as a body error, which tears the client connection down

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, HOST};
use axum::http::{HeaderMap, Request, Response, Uri};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::{Client, Error as ClientError};
use hyper_util::rt::TokioExecutor;
use tokio_stream::StreamExt;
use url::Url;

use crate::config::{validation, FrontendConfig, TimeoutConfig, UpstreamTlsConfig};
use crate::proxy::tls::build_connector;
use crate::proxy::types::{ProxyContext, ProxyError, ProxyResult};
use crate::registry::TenantRegistry;

/// Connection-scoped headers that never cross the proxy.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// One upstream origin with its dedicated connection pool.
struct Upstream {
    client: UpstreamClient,
    /// Origin with any trailing slash removed, ready for path concatenation.
    base: String,
    /// Host header value sent on rewritten requests.
    host: HeaderValue,
}

impl Upstream {
    fn new(
        connector: HttpsConnector<HttpConnector>,
        base: &str,
        host: &str,
    ) -> Result<Self, std::io::Error> {
        let host = HeaderValue::from_str(host)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(10)
            .build(connector);
        Ok(Self {
            client,
            base: base.to_string(),
            host,
        })
    }
}

/// Forwards requests to tenant upstreams and the frontend collaborator.
pub struct Forwarder {
    upstreams: HashMap<String, Upstream>,
    frontend: Upstream,
    connect: Duration,
    idle: Duration,
}

impl Forwarder {
    /// Build the per-tenant clients from a validated registry.
    pub fn new(
        registry: &TenantRegistry,
        frontend: &FrontendConfig,
        timeouts: &TimeoutConfig,
        tls: &UpstreamTlsConfig,
    ) -> Result<Self, std::io::Error> {
        let connect = Duration::from_secs(timeouts.connect_secs);
        let connector = build_connector(tls.verify, connect)?;

        let mut upstreams = HashMap::with_capacity(registry.len());
        for tenant in registry.iter() {
            let upstream =
                Upstream::new(connector.clone(), tenant.origin_base(), &tenant.host_header())?;
            upstreams.insert(tenant.slug.clone(), upstream);
        }

        let frontend_url = validation::parse_origin(&frontend.origin)
            .map_err(|reason| std::io::Error::new(std::io::ErrorKind::InvalidInput, reason))?;
        let frontend = Upstream::new(
            connector,
            frontend.origin.trim_end_matches('/'),
            &authority_of(&frontend_url),
        )?;

        Ok(Self {
            upstreams,
            frontend,
            connect,
            idle: Duration::from_secs(timeouts.idle_secs),
        })
    }

    /// Forward a tenant-scoped request.
    ///
    /// The context carries the stripped path; the request still carries the
    /// original method, headers and body stream. The Host header is
    /// rewritten to the tenant's origin.
    pub async fn forward(
        &self,
        ctx: &ProxyContext,
        request: Request<Body>,
    ) -> ProxyResult<Response<Body>> {
        let upstream = self.upstreams.get(&ctx.tenant_slug).ok_or_else(|| {
            ProxyError::Protocol(format!("no upstream client for tenant '{}'", ctx.tenant_slug))
        })?;
        self.send(upstream, &ctx.upstream_path, ctx.client_addr, request, true)
            .await
    }

    /// Forward a reserved path to the frontend collaborator.
    ///
    /// The path is relayed verbatim and the client's Host header is kept,
    /// so the frontend sees the request exactly as the client addressed it.
    pub async fn pass_through(
        &self,
        client_addr: SocketAddr,
        request: Request<Body>,
    ) -> ProxyResult<Response<Body>> {
        let path = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        self.send(&self.frontend, &path, client_addr, request, false)
            .await
    }

    async fn send(
        &self,
        upstream: &Upstream,
        path_and_query: &str,
        client_addr: SocketAddr,
        request: Request<Body>,
        rewrite_host: bool,
    ) -> ProxyResult<Response<Body>> {
        let (mut parts, body) = request.into_parts();

        let uri: Uri = format!("{}{}", upstream.base, path_and_query)
            .parse()
            .map_err(|e| ProxyError::Protocol(format!("invalid upstream uri: {e}")))?;

        let gateway_host = parts.headers.get(HOST).cloned();

        strip_hop_by_hop(&mut parts.headers);

        if rewrite_host {
            parts.headers.insert(HOST, upstream.host.clone());
            if !parts.headers.contains_key(X_FORWARDED_HOST) {
                if let Some(host) = gateway_host {
                    parts.headers.insert(X_FORWARDED_HOST, host);
                }
            }
        } else if !parts.headers.contains_key(HOST) {
            parts.headers.insert(HOST, upstream.host.clone());
        }

        let client_ip = client_addr.ip().to_string();
        let forwarded_for = match parts
            .headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
        {
            Some(prior) => format!("{prior}, {client_ip}"),
            None => client_ip.clone(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            parts.headers.insert(X_FORWARDED_FOR, value);
        }
        if let Ok(value) = HeaderValue::from_str(&client_ip) {
            parts.headers.insert(X_REAL_IP, value);
        }
        if !parts.headers.contains_key(X_FORWARDED_PROTO) {
            parts
                .headers
                .insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
        }

        // rebuilt rather than reused so the outbound version is hyper's
        // default HTTP/1.1 regardless of what the client spoke
        let mut builder = Request::builder().method(parts.method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = parts.headers;
        }
        let outbound = builder
            .body(body)
            .map_err(|e| ProxyError::Protocol(format!("failed to rebuild request: {e}")))?;

        let response = match tokio::time::timeout(self.idle, upstream.client.request(outbound)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(self.classify(e)),
            Err(_) => return Err(ProxyError::Timeout(self.idle)),
        };

        let (parts, body) = response.into_parts();
        let mut response = Response::from_parts(parts, idle_limited(Body::new(body), self.idle));
        strip_hop_by_hop(response.headers_mut());
        Ok(response)
    }

    fn classify(&self, err: ClientError) -> ProxyError {
        if err.is_connect() {
            if io_kind(&err) == Some(std::io::ErrorKind::TimedOut) {
                return ProxyError::Timeout(self.connect);
            }
            return ProxyError::Unreachable(source_message(&err));
        }
        ProxyError::Protocol(source_message(&err))
    }
}

/// Wrap a response body so every inter-chunk gap is bounded.
///
/// On expiry the stream yields an error, which makes hyper abort the
/// client connection mid-transfer instead of silently truncating.
fn idle_limited(body: Body, idle: Duration) -> Body {
    let stream = body
        .into_data_stream()
        .timeout(idle)
        .map(|chunk| match chunk {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => Err(axum::BoxError::from(e)),
            Err(elapsed) => Err(axum::BoxError::from(elapsed)),
        });
    Body::from_stream(stream)
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// host[:port] for a validated origin, omitting default ports.
fn authority_of(origin: &Url) -> String {
    let host = origin.host_str().unwrap_or_default();
    match origin.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Deepest error in the chain, which carries the concrete cause.
fn source_message(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

/// First io::Error in the chain, if any.
fn io_kind(err: &(dyn std::error::Error + 'static)) -> Option<std::io::ErrorKind> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        current = e.source();
    }
    None
}
