//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! ```rust
//! use strata::{Router, health};
//!
//! # fn main() -> Result<(), strata::RouteError> {
//! let router = Router::new()
//!     .get("/healthz", health::liveness)?
//!     .get("/readyz", health::readiness)?;
//! # Ok(()) }
//! ```
//!
//! Write your own readiness handler to gate on dependencies:
//!
//! ```rust
//! use strata::{Context, Response, StatusCode};
//!
//! async fn readiness(ctx: Context) -> Context {
//!     if dependencies_are_healthy().await {
//!         ctx.with_response("ready")
//!     } else {
//!         ctx.with_response(StatusCode::SERVICE_UNAVAILABLE)
//!     }
//! }
//!
//! async fn dependencies_are_healthy() -> bool { true }
//! ```

use crate::context::Context;

/// Liveness probe: always `200 OK`, body `ok`.
pub async fn liveness(ctx: Context) -> Context {
    ctx.with_response("ok")
}

/// Readiness probe (default): `200 OK`, body `ready`.
pub async fn readiness(ctx: Context) -> Context {
    ctx.with_response("ready")
}
