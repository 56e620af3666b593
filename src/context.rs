//! Per-request context.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, OnceLock};

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use http_body_util::Full;

use crate::request::Request;
use crate::response::{ContentType, IntoResponse, Response};

/// Everything one request's chain works on.
///
/// Created by the dispatcher when a request arrives, passed by value through
/// every middleware and the handler, and consumed by the final flush. It
/// holds the request, the path parameters and matched route filled in by the
/// router, and the [`Response`] buffer that the chain writes into.
#[derive(Debug)]
pub struct Context {
    request: Request,
    routing: RoutingSlot,
    response: Response,
}

/// Where the router records its match. Shared by clones of the handle, so
/// it outlives a context lost to a panic.
pub(crate) type RoutingSlot = Arc<OnceLock<Routing>>;

#[derive(Debug)]
pub(crate) struct Routing {
    route: Arc<str>,
    params: HashMap<String, String>,
}

static NO_PARAMS: LazyLock<HashMap<String, String>> = LazyLock::new(HashMap::new);

impl Context {
    pub fn new(request: Request) -> Self {
        Self::with_routing(request, RoutingSlot::default())
    }

    /// A fresh context for `request` that shares an existing routing slot.
    pub(crate) fn with_routing(request: Request, routing: RoutingSlot) -> Self {
        Self { request, routing, response: Response::default() }
    }

    pub fn request(&self) -> &Request { &self.request }
    pub fn method(&self) -> &Method { self.request.method() }
    pub fn path(&self) -> &str { self.request.path() }

    /// Returns a named path parameter, percent-decoded.
    ///
    /// For a route `/users/:id`, `ctx.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params().get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        self.routing.get().map_or(&*NO_PARAMS, |r| &r.params)
    }

    /// First value of a query-string key, percent-decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        self.request.query(key)
    }

    /// The registration path of the route that matched, e.g. `/users/:id`.
    ///
    /// `None` until routing has run, and for requests that matched nothing.
    /// Outer middlewares read it after `next` returns.
    pub fn matched_route(&self) -> Option<&str> {
        self.routing.get().map(|r| &*r.route)
    }

    /// Routing runs once per request, so the slot is only ever filled here.
    pub(crate) fn set_route(&mut self, route: Arc<str>, params: HashMap<String, String>) {
        let _ = self.routing.set(Routing { route, params });
    }

    pub(crate) fn routing_slot(&self) -> RoutingSlot {
        Arc::clone(&self.routing)
    }

    // ── Response buffer ───────────────────────────────────────────────────────

    pub fn response(&self) -> &Response { &self.response }
    pub fn response_mut(&mut self) -> &mut Response { &mut self.response }

    pub fn status(&self) -> Option<StatusCode> { self.response.status_code() }
    pub fn set_status(&mut self, code: StatusCode) { self.response.set_status(code) }

    pub fn body(&self) -> &[u8] { self.response.body() }
    pub fn set_body(&mut self, body: impl Into<Bytes>) { self.response.set_body(body) }

    /// Sets a response header, replacing any earlier value.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.headers_mut().insert(name, value);
    }

    /// A response header set so far. `None` for values that are not
    /// visible ASCII.
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Writes a body with its content type. The status and the other
    /// headers already set are kept.
    pub fn bytes(&mut self, content_type: ContentType, body: impl Into<Bytes>) {
        self.insert_header(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        self.set_body(body);
    }

    pub fn text(&mut self, body: impl Into<String>) {
        let body: String = body.into();
        self.bytes(ContentType::Text, body);
    }

    pub fn json(&mut self, body: impl Into<Bytes>) {
        self.bytes(ContentType::Json, body);
    }

    /// Replaces the whole response buffer.
    pub fn respond(&mut self, res: impl IntoResponse) {
        self.response = res.into_response();
    }

    /// [`respond`](Context::respond), for the last line of a handler:
    ///
    /// ```rust
    /// use strata::{Context, Response};
    ///
    /// async fn hello(ctx: Context) -> Context {
    ///     ctx.with_response(Response::text("hello"))
    /// }
    /// ```
    pub fn with_response(mut self, res: impl IntoResponse) -> Self {
        self.respond(res);
        self
    }

    /// Writes the buffered status, headers and body out as one response.
    /// Consumes the context, so it happens once per request.
    pub(crate) fn flush(self) -> http::Response<Full<Bytes>> {
        self.response.into_http()
    }
}
