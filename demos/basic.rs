//! Minimal strata example: CRUD-style JSON endpoints, middleware, health checks.
//!
//! Run with:
//!   RUST_LOG=info,strata=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users/abc          # 404: id must be numeric
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42 # 401 without x-admin
//!   curl http://localhost:3000/static/css/site.css
//!   curl http://localhost:3000/healthz

use strata::middleware::{self, AccessLog, ErrorPages, Recover};
use strata::{Context, Method, Response, Router, Server, StatusCode, health};
use strata::http::header::{self, HeaderValue};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let admin_only = middleware::from_fn(|mut ctx: Context, next| async move {
        if ctx.request().header("x-admin").is_none() {
            ctx.set_status(StatusCode::UNAUTHORIZED);
            return ctx;
        }
        next.run(ctx).await
    });

    let app = Router::new()
        .with_global_middleware([
            middleware::trace(),
            AccessLog::new().build(),
            ErrorPages::new()
                .page(StatusCode::NOT_FOUND, "<h1>Not here</h1>")
                .build(),
            Recover::new().build(),
        ])
        .get(r"/users/:id(\d+)", get_user)?
        .post("/users", create_user)?
        .delete(r"/users/:id(\d+)", delete_user)?
        .use_middleware(Method::DELETE, r"/users/:id(\d+)", [admin_only])?
        .get("/static/*", static_file)?
        .get("/healthz", health::liveness)?
        .get("/readyz", health::readiness)?;

    Server::bind("0.0.0.0:3000").serve(app).await?;
    Ok(())
}

// GET /users/:id
async fn get_user(ctx: Context) -> Context {
    let id = ctx.param("id").unwrap_or("0").to_owned();
    ctx.with_response(Response::json(format!(r#"{{"id":{id},"name":"alice"}}"#)))
}

// POST /users
//
// The body is raw bytes; parse with serde_json::from_slice or whatever you like.
async fn create_user(mut ctx: Context) -> Context {
    if ctx.request().body().is_empty() {
        ctx.set_status(StatusCode::BAD_REQUEST);
        return ctx;
    }
    let mut res = Response::json(r#"{"id":99,"name":"new_user"}"#).with_status(StatusCode::CREATED);
    res.headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static("/users/99"));
    ctx.with_response(res)
}

// DELETE /users/:id → 204 No Content
async fn delete_user(ctx: Context) -> Context {
    ctx.with_response(StatusCode::NO_CONTENT)
}

// GET /static/*
async fn static_file(ctx: Context) -> Context {
    let path = ctx.path().trim_start_matches("/static/").to_owned();
    ctx.with_response(format!("would serve `{path}`"))
}
