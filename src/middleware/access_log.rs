//! Access logging.

use std::sync::Arc;

use tracing::info;

use super::{Middleware, from_fn};
use crate::context::Context;

/// One access-log line, handed to the sink after the chain has run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessLogEntry {
    pub host: Option<String>,
    /// The registration path that matched; `None` for `404`s.
    pub route: Option<String>,
    pub method: String,
    pub path: String,
    pub status: u16,
}

impl AccessLogEntry {
    fn from_context(ctx: &Context) -> Self {
        Self {
            host: ctx.request().host().map(str::to_owned),
            route: ctx.matched_route().map(str::to_owned),
            method: ctx.method().to_string(),
            path: ctx.path().to_owned(),
            status: ctx.status().map_or(200, |s| s.as_u16()),
        }
    }
}

type Sink = Arc<dyn Fn(&AccessLogEntry) + Send + Sync + 'static>;

/// Access-log middleware builder.
///
/// By default every request is logged through `tracing` at `info` level
/// with target `strata::access`:
///
/// ```rust
/// use strata::Router;
/// use strata::middleware::AccessLog;
///
/// let router = Router::new().with_global_middleware([AccessLog::new().build()]);
/// ```
///
/// Replace the sink to ship entries elsewhere:
///
/// ```rust
/// use strata::middleware::AccessLog;
///
/// let mw = AccessLog::new()
///     .with_sink(|entry| eprintln!("{} {} -> {}", entry.method, entry.path, entry.status))
///     .build();
/// ```
#[derive(Clone)]
pub struct AccessLog {
    sink: Sink,
}

impl AccessLog {
    pub fn new() -> Self {
        Self { sink: Arc::new(log_with_tracing) }
    }

    pub fn with_sink(mut self, sink: impl Fn(&AccessLogEntry) + Send + Sync + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn build(self) -> Middleware {
        let sink = self.sink;
        from_fn(move |ctx, next| {
            let sink = Arc::clone(&sink);
            async move {
                let ctx = next.run(ctx).await;
                sink(&AccessLogEntry::from_context(&ctx));
                ctx
            }
        })
    }
}

impl Default for AccessLog {
    fn default() -> Self { Self::new() }
}

fn log_with_tracing(entry: &AccessLogEntry) {
    info!(
        target: "strata::access",
        host = entry.host.as_deref(),
        route = entry.route.as_deref(),
        method = %entry.method,
        path = %entry.path,
        status = entry.status,
        "request served"
    );
}
