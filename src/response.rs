//! The buffered response and the [`IntoResponse`] conversion trait.
//!
//! Nothing in a request's chain writes to the connection. Handlers and
//! middlewares fill a [`Response`] held by the [`Context`](crate::Context);
//! the dispatcher turns it into one HTTP response once the whole chain has
//! returned. That is what lets an outer middleware see, and rewrite, what an
//! inner one produced.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`Response::bytes`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// A buffered HTTP response.
///
/// ```rust
/// use strata::{ContentType, Response, StatusCode};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// Response::bytes(ContentType::Xml, b"<ok/>".to_vec())
///     .with_status(StatusCode::CREATED);
/// ```
///
/// A status that was never set flushes as `200 OK`.
#[derive(Clone, Debug, Default)]
pub struct Response {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `application/json`. Pass bytes from your serialiser directly.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::bytes(ContentType::Json, body)
    }

    /// `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::bytes(ContentType::Text, body)
    }

    /// A body of any [`ContentType`].
    pub fn bytes(content_type: ContentType, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        Self { status: None, headers, body: body.into() }
    }

    /// A response with a status and no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: Some(code), ..Self::default() }
    }

    pub fn with_status(mut self, code: StatusCode) -> Self {
        self.status = Some(code);
        self
    }

    /// The status set so far, if any.
    pub fn status_code(&self) -> Option<StatusCode> { self.status }
    pub fn set_status(&mut self, code: StatusCode) { self.status = Some(code) }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    pub fn body(&self) -> &[u8] { &self.body }
    pub fn set_body(&mut self, body: impl Into<Bytes>) { self.body = body.into() }

    /// Converts the buffer into the single response written to the wire.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *res.headers_mut() = self.headers;
        res
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into a [`Response`].
///
/// Implement on your own types to hand them to
/// [`Context::respond`](crate::Context::respond).
///
/// ```rust,ignore
/// struct Json<T: Serialize>(T);
///
/// impl<T: Serialize> IntoResponse for Json<T> {
///     fn into_response(self) -> Response {
///         match serde_json::to_vec(&self.0) {
///             Ok(bytes) => Response::json(bytes),
///             Err(_)    => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
///         }
///     }
/// }
/// ```
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

/// `(StatusCode::CREATED, "done")`
impl<T: IntoResponse> IntoResponse for (StatusCode, T) {
    fn into_response(self) -> Response { self.1.into_response().with_status(self.0) }
}
