//! Route registration.
//!
//! [`Router`] is the builder half of a two-phase lifecycle: register routes
//! and middleware on it, then [`freeze`](Router::freeze) it into an
//! immutable [`App`] that serves traffic. Every registration returns
//! `Result`, so a broken route table stops startup at the line that broke it.

use http::Method;
use tracing::debug;

use crate::app::App;
use crate::error::RouteError;
use crate::handler::Handler;
use crate::middleware::Middleware;
use crate::tree::{RouteMatch, RouteTrie};

/// The application router (builder).
///
/// One routing tree per HTTP method. Each call consumes and returns `self`
/// so registrations chain with `?`:
///
/// ```rust
/// # use strata::{Context, Method, Router, RouteError};
/// # async fn list(ctx: Context) -> Context { ctx }
/// # async fn show(ctx: Context) -> Context { ctx }
/// # async fn create(ctx: Context) -> Context { ctx }
/// # fn main() -> Result<(), RouteError> {
/// let router = Router::new()
///     .get("/users", list)?
///     .get(r"/users/:id(\d+)", show)?
///     .on(Method::POST, "/users", create)?;
/// # Ok(()) }
/// ```
///
/// Path syntax:
///
/// | Token | Matches | Captures |
/// |---|---|---|
/// | `users` | exactly `users` | |
/// | `:id` | any one segment | `id` |
/// | `:id(\d+)` | one segment fully matching the pattern | `id` |
/// | `*` | everything that is left (last segment only) | |
#[derive(Default)]
pub struct Router {
    trie: RouteTrie,
    global: Vec<Middleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a method + path pair.
    ///
    /// Any method is accepted, including extension methods such as `PURGE`.
    ///
    /// # Errors
    ///
    /// - [`Syntax`](crate::RouteErrorKind::Syntax) /
    ///   [`InvalidPattern`](crate::RouteErrorKind::InvalidPattern) for a
    ///   malformed path;
    /// - [`Conflict`](crate::RouteErrorKind::Conflict) when the path puts a
    ///   wildcard and a parameter, or two different parameters, at one
    ///   position;
    /// - [`Duplicate`](crate::RouteErrorKind::Duplicate) when this method
    ///   and path already have a handler.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        debug!(%method, path, "registering route");
        self.trie.add_route(method, path, handler.into_next())?;
        Ok(self)
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.on(Method::DELETE, path, handler)
    }

    pub fn head(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.on(Method::HEAD, path, handler)
    }

    pub fn options(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.on(Method::OPTIONS, path, handler)
    }

    /// Attaches middleware to one method + path, independently of its
    /// handler. Order of registration does not matter: the handler can be
    /// added before or after. Repeated calls append.
    ///
    /// Route-scoped middleware runs inside the global middleware and only
    /// when this exact route matched with a handler.
    ///
    /// # Errors
    ///
    /// The same path errors as [`on`](Router::on), except `Duplicate`.
    pub fn use_middleware(
        mut self,
        method: Method,
        path: &str,
        middlewares: impl IntoIterator<Item = Middleware>,
    ) -> Result<Self, RouteError> {
        self.trie.add_middlewares(method, path, middlewares)?;
        Ok(self)
    }

    /// Appends server-wide middleware, outermost first by argument order.
    ///
    /// Global middleware wraps the whole pipeline: routing, route-scoped
    /// middleware, the handler, and the `404` fallback.
    pub fn with_global_middleware(mut self, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        self.global.extend(middlewares);
        self
    }

    /// Looks up a path without dispatching. See [`App::find_route`].
    pub fn find_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.trie.find_route(method, path)
    }

    /// Composes every middleware chain and returns the immutable [`App`].
    pub fn freeze(self) -> App {
        App::new(self.trie, self.global)
    }
}

impl From<Router> for App {
    fn from(router: Router) -> Self {
        router.freeze()
    }
}
