//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, dispatch, forwarding, error pages)
//!     → request.rs (request ID middleware)
//!     → api.rs (tenant discovery endpoint)
//! ```

pub mod api;
pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, StartupError};
