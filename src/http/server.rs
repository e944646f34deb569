//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router: discovery route plus the catch-all handler
//! - Wire middleware (request ID, tracing)
//! - Dispatch paths, resolve tenants, drive the forwarder
//! - Apply response rewriting before the body flows
//! - Render error pages on upstream failure
//! - Emit the per-request access log line and metrics
//!
//! # Data Flow
//! ```text
//! client → dispatcher → registry lookup → forwarder → rewriter → client
//!              │              │               │
//!              │              └ 404 page      └ 502 page on ProxyError
//!              └ passthrough to frontend, or 302 to /
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{GatewayConfig, ValidationError};
use crate::http::api::list_states;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::observability::metrics;
use crate::proxy::error_page;
use crate::proxy::forwarder::Forwarder;
use crate::proxy::rewrite::{rewrite_response, RewritePolicy};
use crate::proxy::types::ProxyContext;
use crate::registry::TenantRegistry;
use crate::routing::{dispatch, RouteDecision};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TenantRegistry>,
    pub forwarder: Arc<Forwarder>,
    pub rewrite_policy: RewritePolicy,
}

/// Failure while assembling the gateway at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid tenant configuration: {0}")]
    Registry(#[from] ValidationError),

    #[error("failed to build upstream clients: {0}")]
    Clients(#[from] std::io::Error),
}

/// The gateway's HTTP server.
pub struct GatewayServer {
    router: Router,
    registry: Arc<TenantRegistry>,
}

impl GatewayServer {
    /// Assemble the gateway from a validated configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, StartupError> {
        let registry = Arc::new(TenantRegistry::from_config(&config.tenants)?);
        let forwarder = Arc::new(Forwarder::new(
            &registry,
            &config.frontend,
            &config.timeouts,
            &config.upstream_tls,
        )?);

        let state = AppState {
            registry: Arc::clone(&registry),
            forwarder,
            rewrite_policy: RewritePolicy {
                allow_framing: config.embedding.allow_framing,
            },
        };

        Ok(Self {
            router: Self::build_router(state),
            registry,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The gateway claims only `GET /api/states`; other methods on that
    /// path take the same frontend passthrough as the rest of `/api/*`.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/api/states", get(list_states).fallback(gateway_handler))
            .fallback(gateway_handler)
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Tenants served by this instance.
    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Run the server until the shutdown signal fires.
    ///
    /// In-flight requests are drained before this returns.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tenants = self.registry.len(), "gateway listening");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}

/// Catch-all handler: every path except the gateway's own routes lands here.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    enum Target {
        Proxy { slug: String, upstream_path: String },
        Passthrough,
        RedirectHome,
    }

    // decided before the request is moved; the decision borrows the path
    let target = {
        match dispatch(request.uri().path()) {
            RouteDecision::Proxy {
                slug,
                upstream_path,
            } => {
                let upstream_path = match request.uri().query() {
                    Some(query) => format!("{upstream_path}?{query}"),
                    None => upstream_path.to_string(),
                };
                Target::Proxy {
                    slug: slug.to_string(),
                    upstream_path,
                }
            }
            RouteDecision::Passthrough => Target::Passthrough,
            RouteDecision::RedirectHome => Target::RedirectHome,
        }
    };

    match target {
        Target::Proxy {
            slug,
            upstream_path,
        } => proxy_request(state, slug, upstream_path, client_addr, request).await,
        Target::Passthrough => pass_through(state, client_addr, request).await,
        Target::RedirectHome => redirect_home(),
    }
}

async fn proxy_request(
    state: AppState,
    slug: String,
    upstream_path: String,
    client_addr: SocketAddr,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request.request_id().unwrap_or("unknown").to_string();

    let tenant = match state.registry.resolve(&slug) {
        Some(tenant) => tenant,
        None => {
            tracing::info!(
                request_id = %request_id,
                tenant = %slug,
                method = %method,
                path = %path,
                status = 404,
                "unknown tenant"
            );
            // fixed label: the slug is client-controlled, and every label
            // value becomes a series the exporter keeps
            metrics::record_request("unknown", &method, 404, start);
            return error_page::unknown_tenant();
        }
    };

    let ctx = ProxyContext {
        tenant_slug: tenant.slug.clone(),
        upstream_path,
        client_addr,
    };

    tracing::debug!(
        request_id = %request_id,
        tenant = %tenant.slug,
        upstream_path = %ctx.upstream_path,
        "forwarding to upstream"
    );

    match state.forwarder.forward(&ctx, request).await {
        Ok(mut response) => {
            rewrite_response(
                response.status(),
                response.headers_mut(),
                &tenant,
                state.rewrite_policy,
            );
            let status = response.status().as_u16();
            tracing::info!(
                request_id = %request_id,
                tenant = %tenant.slug,
                method = %method,
                path = %path,
                status,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "proxied"
            );
            metrics::record_request(&tenant.slug, &method, status, start);
            response
        }
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                tenant = %tenant.slug,
                method = %method,
                path = %path,
                kind = err.kind(),
                error = %err,
                "upstream failure"
            );
            metrics::record_request(&tenant.slug, &method, 502, start);
            metrics::record_upstream_error(&tenant.slug, err.kind());
            error_page::bad_gateway(&tenant.display_name)
        }
    }
}

async fn pass_through(
    state: AppState,
    client_addr: SocketAddr,
    request: Request<Body>,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request.request_id().unwrap_or("unknown").to_string();

    match state.forwarder.pass_through(client_addr, request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                kind = err.kind(),
                error = %err,
                "frontend passthrough failure"
            );
            error_page::service_unavailable()
        }
    }
}

/// 302 home, the answer for every unscoped application path.
fn redirect_home() -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, HeaderValue::from_static("/"))],
    )
        .into_response()
}
