//! Error-page rewriting.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};

use super::{Middleware, from_fn};
use crate::response::ContentType;

/// Replaces the body of responses whose final status has a registered page.
///
/// Runs after the inner chain, so it sees the status exactly as the handler
/// (or the `404` fallback, when installed globally) left it. The status is
/// kept; the body is swapped and `content-type` set to HTML.
///
/// ```rust
/// use strata::StatusCode;
/// use strata::middleware::ErrorPages;
///
/// let mw = ErrorPages::new()
///     .page(StatusCode::NOT_FOUND, "<h1>Nothing here</h1>")
///     .page(StatusCode::INTERNAL_SERVER_ERROR, "<h1>Something broke</h1>")
///     .build();
/// ```
#[derive(Clone, Debug, Default)]
pub struct ErrorPages {
    pages: HashMap<StatusCode, Bytes>,
}

impl ErrorPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, status: StatusCode, body: impl Into<Bytes>) -> Self {
        self.pages.insert(status, body.into());
        self
    }

    pub fn build(self) -> Middleware {
        let pages = Arc::new(self.pages);
        from_fn(move |ctx, next| {
            let pages = Arc::clone(&pages);
            async move {
                let mut ctx = next.run(ctx).await;
                let page = ctx.status().and_then(|status| pages.get(&status));
                if let Some(page) = page.cloned() {
                    ctx.set_body(page);
                    ctx.response_mut()
                        .headers_mut()
                        .insert(CONTENT_TYPE, HeaderValue::from_static(ContentType::Html.as_str()));
                }
                ctx
            }
        })
    }
}
