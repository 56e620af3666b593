//! Request dispatch.
//!
//! ```text
//! Request
//!   → Context::new
//!   → global middleware ──────────────────────────────┐
//!       → route lookup                                │
//!           ├─ matched, has handler                   │
//!           │    → route-scoped middleware → handler  │
//!           └─ otherwise → 404 "Not Found"            │
//!   ← global middleware (way out) ────────────────────┘
//!   → flush: one status, one header block, one body
//! ```
//!
//! The whole chain is composed once, in [`Router::freeze`](crate::Router::freeze). Serving a
//! request is one lookup, a handful of virtual calls, and the flush.

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::Full;
use tracing::debug;

use crate::context::Context;
use crate::handler::{BoxFuture, Next};
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::tree::{RouteMatch, RouteTrie};

/// A frozen application: routes plus composed middleware, ready to serve.
///
/// Produced by [`Router::freeze`](crate::Router::freeze). Immutable, `Send + Sync`, and shared
/// between connections behind an `Arc` by the [`Server`](crate::Server).
/// Call [`serve`](App::serve) directly to dispatch a request in tests.
#[derive(Clone)]
pub struct App {
    trie: Arc<RouteTrie>,
    chain: Next,
}

impl App {
    pub(crate) fn new(mut trie: RouteTrie, global: Vec<Middleware>) -> Self {
        trie.seal();
        let trie = Arc::new(trie);
        for (method, path) in trie.routes() {
            debug!(%method, path, "route ready");
        }

        let lookup = {
            let trie = Arc::clone(&trie);
            move |ctx: Context| route(&trie, ctx)
        };
        let chain = middleware::build(lookup, &global);

        Self { trie, chain }
    }

    /// Runs one request through the chain and flushes the buffered result.
    ///
    /// Never fails: unknown methods, unknown paths and paths without a
    /// handler all come back as `404 Not Found`.
    pub async fn serve(&self, req: Request) -> http::Response<Full<Bytes>> {
        self.chain.run(Context::new(req)).await.flush()
    }

    /// Looks up a path without dispatching.
    ///
    /// A match may have no handler (a prefix of a registered route); the
    /// dispatcher treats that as not found, but the distinction is there
    /// for diagnostics.
    pub fn find_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.trie.find_route(method, path)
    }

    /// Every `(method, route)` pair with a handler.
    pub fn routes(&self) -> Vec<(&Method, &str)> {
        self.trie.routes()
    }
}

/// The innermost step of the global chain: find the route and run its
/// chain, or answer `404`.
fn route(trie: &RouteTrie, mut ctx: Context) -> BoxFuture {
    let endpoint = trie.find_route(ctx.method(), ctx.path()).and_then(|found| {
        let handler = found.handler()?.clone();
        Some((handler, found.route_arc()?, found.into_params()))
    });

    match endpoint {
        Some((handler, route, params)) => {
            ctx.set_route(route, params);
            handler.run(ctx)
        }
        None => {
            debug!(method = %ctx.method(), path = ctx.path(), "no route");
            ctx.respond(Response::text("Not Found").with_status(StatusCode::NOT_FOUND));
            Box::pin(std::future::ready(ctx))
        }
    }
}
