//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// An incoming HTTP request, fully read off the connection.
///
/// Cloning is cheap for the body (a [`Bytes`] handle) and copies the head.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// A request with no headers and an empty body.
    ///
    /// `target` is the request target as it appears on the request line:
    /// a path, optionally followed by `?query`.
    ///
    /// ```rust
    /// use strata::{Method, Request};
    ///
    /// let req = Request::new(Method::GET, "/users/42?verbose=1");
    /// assert_eq!(req.path(), "/users/42");
    /// assert_eq!(req.query_string(), Some("verbose=1"));
    /// ```
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        Self {
            method,
            path: path.to_owned(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
        }
    }

    pub fn method(&self) -> &Method { &self.method }

    /// The path as it arrived, still percent-encoded. Routing and path
    /// parameters work on decoded segments.
    pub fn path(&self) -> &str { &self.path }

    pub fn query_string(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup (names are case-insensitive). Returns `None` for values
    /// that are not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `host` header, if present.
    pub fn host(&self) -> Option<&str> {
        self.header("host")
    }

    /// First value of a query-string key, percent-decoded.
    ///
    /// `?tag=a&tag=b` → `query("tag") == Some("a")`.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}
