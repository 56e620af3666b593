//! # strata
//!
//! A small HTTP framework built around two things: a routing trie and an
//! onion of middleware.
//!
//! - **Routing**: one tree per HTTP method. Static segments, `:name`
//!   parameters, `:name(regex)` constrained parameters and a trailing `*`
//!   wildcard. Static beats regex beats plain parameter beats wildcard.
//!   A broken route table is a [`RouteError`] at startup, never a surprise
//!   at request time.
//! - **Middleware**: each layer wraps the rest of the chain. Global layers
//!   wrap everything, route-scoped layers wrap one handler. Handlers write
//!   into a buffered response on the [`Context`]; nothing reaches the socket
//!   until the whole chain has returned, so outer layers can still rewrite it.
//! - **Transport**: hyper + tokio, graceful shutdown on SIGTERM / Ctrl-C.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strata::{Context, Response, Router, Server, StatusCode, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = Router::new()
//!         .with_global_middleware([middleware::trace(), middleware::Recover::new().build()])
//!         .get(r"/users/:id(\d+)", get_user)?
//!         .post("/users", create_user)?;
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await?;
//!     Ok(())
//! }
//!
//! async fn get_user(ctx: Context) -> Context {
//!     let id = ctx.param("id").unwrap_or("unknown").to_owned();
//!     // strata sends bytes; it doesn't care how you build them.
//!     ctx.with_response(Response::json(format!(r#"{{"id":{id}}}"#)))
//! }
//!
//! async fn create_user(mut ctx: Context) -> Context {
//!     if ctx.request().body().is_empty() {
//!         ctx.set_status(StatusCode::BAD_REQUEST);
//!         return ctx;
//!     }
//!     ctx.with_response((StatusCode::CREATED, Response::json(r#"{"id":99}"#)))
//! }
//! ```

mod app;
mod context;
mod error;
mod handler;
mod path;
mod request;
mod response;
mod router;
mod server;
mod tree;

pub mod health;
pub mod middleware;

pub use app::App;
pub use context::Context;
pub use error::{Error, RouteError, RouteErrorKind};
pub use handler::{BoxFuture, Handler, Next};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use tree::RouteMatch;

pub use http::{self, Method, StatusCode};
