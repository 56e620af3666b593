//! Per-request tracing span.

use tracing::field::Empty;
use tracing::{Instrument, info_span};

use super::{Middleware, from_fn};

/// Opens an `info` span named `request` around the rest of the chain.
///
/// `method` and `path` are recorded on the way in. `route` (the matched
/// registration path, e.g. `/users/:id`) and `status` are only known once the
/// inner chain has run, so they are recorded on the way out. Install it
/// first among the global middlewares so the span covers everything,
/// including the `404` fallback.
///
/// ```rust
/// use strata::{Router, middleware};
///
/// let router = Router::new().with_global_middleware([middleware::trace()]);
/// ```
pub fn trace() -> Middleware {
    from_fn(|ctx, next| async move {
        let span = info_span!(
            "request",
            method = %ctx.method(),
            path = ctx.path(),
            route = Empty,
            status = Empty,
        );

        let ctx = next.run(ctx).instrument(span.clone()).await;

        if let Some(route) = ctx.matched_route() {
            span.record("route", route);
        }
        span.record("status", ctx.status().map_or(200, |s| s.as_u16()));
        ctx
    })
}
