//! Middleware: the onion model.
//!
//! A [`Middleware`] turns the rest of the chain ([`Next`]) into a new
//! [`Next`]. Composing `[m1, m2, m3]` around a handler `h` gives
//! `m1(m2(m3(h)))`, so for a request:
//!
//! ```text
//! m1 before → m2 before → m3 before → h → m3 after → m2 after → m1 after
//! ```
//!
//! Code before `next.run(ctx).await` runs on the way in, in registration
//! order. Code after it runs on the way out, in reverse, and sees the
//! response everything inside produced. Not calling `next` at all
//! short-circuits: nothing inside runs and the response is whatever the
//! context held at that point.
//!
//! Two scopes are composed by the [`Router`](crate::Router):
//!
//! - **global** ([`Router::with_global_middleware`](crate::Router::with_global_middleware))
//!   wraps every request, the `404` fallback included;
//! - **route-scoped** ([`Router::use_middleware`](crate::Router::use_middleware))
//!   wraps only the handler of that method + path, inside the global ones.
//!
//! Writing one:
//!
//! ```rust
//! use strata::middleware::{self, Middleware};
//! use strata::http::header::{HeaderValue, SERVER};
//!
//! let server_header: Middleware = middleware::from_fn(|ctx, next| async move {
//!     let mut ctx = next.run(ctx).await;
//!     ctx.response_mut().headers_mut().insert(SERVER, HeaderValue::from_static("strata"));
//!     ctx
//! });
//! ```
//!
//! Built-in middleware lives in the submodules: request tracing spans,
//! access logging, panic recovery and error-page rewriting.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::context::Context;
use crate::handler::{Handler, Next};

mod access_log;
mod error_pages;
mod recover;
mod trace;

pub use access_log::{AccessLog, AccessLogEntry};
pub use error_pages::ErrorPages;
pub use recover::Recover;
pub use trace::trace;

/// A transformer from the rest of the chain to a new chain.
///
/// Cheap to clone; the same middleware value can be attached to any number
/// of routes.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(Next) -> Next + Send + Sync + 'static>);

impl Middleware {
    /// Wraps a raw `Next → Next` transformer.
    ///
    /// The transformer runs once, when the chain is composed at
    /// [`Router::freeze`](crate::Router::freeze), not per request. Most
    /// middleware is easier to write with [`from_fn`].
    pub fn new<F, H>(f: F) -> Self
    where
        F: Fn(Next) -> H + Send + Sync + 'static,
        H: Handler,
    {
        Self(Arc::new(move |next: Next| -> Next { f(next).into_next() }))
    }

    /// Wraps `next` in this layer.
    pub fn wrap(&self, next: Next) -> Next {
        (self.0)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// Builds a middleware from an async function of the context and the rest
/// of the chain.
pub fn from_fn<F, Fut>(f: F) -> Middleware
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    let f = Arc::new(f);
    Middleware::new(move |next: Next| {
        let f = Arc::clone(&f);
        move |ctx: Context| f(ctx, next.clone())
    })
}

/// Composes `middlewares` around `handler`, first middleware outermost.
///
/// Folds from the last middleware to the first, so that `middlewares[0]`
/// ends up wrapping everything else.
pub fn build(handler: impl Handler, middlewares: &[Middleware]) -> Next {
    middlewares
        .iter()
        .rev()
        .fold(handler.into_next(), |next, mw| mw.wrap(next))
}
