//! Panic recovery.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use http::StatusCode;
use tracing::error;

use super::{Middleware, from_fn};
use crate::context::Context;

type OnPanic = Arc<dyn Fn(&Context, &str) + Send + Sync + 'static>;

/// Turns a panic anywhere inside it into a normal response.
///
/// The dispatcher itself never catches panics; install this (usually as the
/// outermost or second-outermost global middleware) to contain them. When
/// the inner chain panics, the context it owned is gone with it, so a fresh
/// one is built from a copy of the request taken on the way in, and given
/// the configured status (default `500`) and body.
///
/// The matched route and path parameters survive the panic, so outer
/// middleware such as [`AccessLog`](super::AccessLog) still reports the
/// route. Headers the inner chain had set on the response do not.
///
/// ```rust
/// use strata::StatusCode;
/// use strata::middleware::Recover;
///
/// let mw = Recover::new()
///     .status(StatusCode::SERVICE_UNAVAILABLE)
///     .body("try again later")
///     .build();
/// ```
#[derive(Clone)]
pub struct Recover {
    status: StatusCode,
    body: Bytes,
    on_panic: OnPanic,
}

impl Recover {
    pub fn new() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Bytes::from_static(b"Internal Server Error"),
            on_panic: Arc::new(log_panic),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Called with the rebuilt context and the panic message. Replaces the
    /// default, which logs at `error` level.
    pub fn on_panic(mut self, f: impl Fn(&Context, &str) + Send + Sync + 'static) -> Self {
        self.on_panic = Arc::new(f);
        self
    }

    pub fn build(self) -> Middleware {
        let config = Arc::new(self);
        from_fn(move |ctx, next| {
            let config = Arc::clone(&config);
            async move {
                let request = ctx.request().clone();
                let routing = ctx.routing_slot();
                match AssertUnwindSafe(next.run(ctx)).catch_unwind().await {
                    Ok(ctx) => ctx,
                    Err(payload) => {
                        let mut ctx = Context::with_routing(request, routing);
                        ctx.set_status(config.status);
                        ctx.set_body(config.body.clone());
                        (config.on_panic)(&ctx, panic_message(payload.as_ref()));
                        ctx
                    }
                }
            }
        })
    }
}

impl Default for Recover {
    fn default() -> Self { Self::new() }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn log_panic(ctx: &Context, message: &str) {
    error!(method = %ctx.method(), path = ctx.path(), panic = message, "handler panicked");
}
