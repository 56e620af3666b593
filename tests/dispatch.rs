use http_body_util::BodyExt;
use strata::{
    App, Context, Method, Request, Response, RouteErrorKind, Router, StatusCode, http,
};

async fn call(app: &App, method: Method, target: &str) -> (StatusCode, String) {
    let res = app.serve(Request::new(method, target)).await;
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn reply(body: &'static str) -> impl Fn(Context) -> std::future::Ready<Context> + Send + Sync + 'static {
    move |ctx| std::future::ready(ctx.with_response(body))
}

async fn echo_params(ctx: Context) -> Context {
    let mut pairs: Vec<_> = ctx.params().iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    let route = ctx.matched_route().unwrap_or("-").to_owned();
    ctx.with_response(format!("{route} {}", pairs.join("&")))
}

fn app() -> App {
    Router::new()
        .get("/", reply("root"))
        .unwrap()
        .get("/order/detail", reply("detail"))
        .unwrap()
        .get("/order/*", reply("order wildcard"))
        .unwrap()
        .get("/a/b/*", reply("deep wildcard"))
        .unwrap()
        .get("/user/:id", echo_params)
        .unwrap()
        .get(r"/item/:id(\d+)", echo_params)
        .unwrap()
        .get("/user/:id/post/:post", echo_params)
        .unwrap()
        .post("/user/:id", reply("posted"))
        .unwrap()
        .freeze()
}

#[tokio::test]
async fn root() {
    assert_eq!(call(&app(), Method::GET, "/").await, (StatusCode::OK, "root".to_owned()));
}

#[tokio::test]
async fn static_wins_over_wildcard() {
    let app = app();
    assert_eq!(call(&app, Method::GET, "/order/detail").await.1, "detail");
    assert_eq!(call(&app, Method::GET, "/order/42").await.1, "order wildcard");
}

#[tokio::test]
async fn wildcard_consumes_any_depth() {
    assert_eq!(call(&app(), Method::GET, "/a/b/c/d").await.1, "deep wildcard");
}

#[tokio::test]
async fn params_are_captured() {
    let app = app();
    assert_eq!(call(&app, Method::GET, "/user/123").await.1, "/user/:id id=123");
    assert_eq!(
        call(&app, Method::GET, "/user/7/post/hello").await.1,
        "/user/:id/post/:post id=7&post=hello"
    );
}

#[tokio::test]
async fn regex_param_must_match() {
    let app = app();
    assert_eq!(call(&app, Method::GET, r"/item/123").await.1, r"/item/:id(\d+) id=123");
    assert_eq!(
        call(&app, Method::GET, "/item/abc").await,
        (StatusCode::NOT_FOUND, "Not Found".to_owned())
    );
}

#[tokio::test]
async fn unknown_path_method_and_prefix_are_404() {
    let app = app();
    for (method, path) in [
        (Method::GET, "/nope"),
        (Method::DELETE, "/user/1"),
        (Method::GET, "/a"),
        (Method::from_bytes(b"PURGE").unwrap(), "/"),
    ] {
        let (status, body) = call(&app, method.clone(), path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {path}");
        assert_eq!(body, "Not Found");
    }
}

#[tokio::test]
async fn not_found_is_plain_text() {
    let res = app().serve(Request::new(Method::GET, "/missing")).await;
    assert_eq!(res.headers()[http::header::CONTENT_TYPE], "text/plain; charset=utf-8");
}

#[tokio::test]
async fn methods_are_separate_namespaces() {
    assert_eq!(call(&app(), Method::POST, "/user/1").await.1, "posted");
}

#[tokio::test]
async fn query_string_does_not_affect_routing() {
    let app = Router::new()
        .get("/search", |ctx: Context| async move {
            let q = ctx.query("q").unwrap_or_default();
            ctx.with_response(q)
        })
        .unwrap()
        .freeze();
    assert_eq!(call(&app, Method::GET, "/search?q=a%20b").await.1, "a b");
}

#[tokio::test]
async fn percent_encoded_segments_are_decoded() {
    let app = Router::new()
        .get("/user/:name", echo_params)
        .unwrap()
        .get("/café", reply("coffee"))
        .unwrap()
        .get(r"/tag/:t(\w+ \w+)", echo_params)
        .unwrap()
        .freeze();

    assert_eq!(call(&app, Method::GET, "/user/john%20doe").await.1, "/user/:name name=john doe");
    assert_eq!(call(&app, Method::GET, "/user/a%2Fb").await.1, "/user/:name name=a/b");
    assert_eq!(call(&app, Method::GET, "/caf%C3%A9").await, (StatusCode::OK, "coffee".to_owned()));
    assert_eq!(call(&app, Method::GET, "/tag/big%20deal").await.1, r"/tag/:t(\w+ \w+) t=big deal");
}

#[tokio::test]
async fn unset_status_flushes_as_200_and_headers_survive() {
    let app = Router::new()
        .get("/csv", |ctx: Context| async move {
            ctx.with_response((StatusCode::ACCEPTED, Response::bytes(strata::ContentType::Csv, "a,b")))
        })
        .unwrap()
        .get("/empty", |ctx: Context| async move { ctx })
        .unwrap()
        .freeze();

    let res = app.serve(Request::new(Method::GET, "/csv")).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(res.headers()[http::header::CONTENT_TYPE], "text/csv");

    assert_eq!(call(&app, Method::GET, "/empty").await, (StatusCode::OK, String::new()));
}

#[test]
fn registration_errors_are_tagged() {
    let kind = |r: Result<Router, strata::RouteError>| r.err().map(|e| e.kind());

    assert_eq!(kind(Router::new().get("no-slash", reply(""))), Some(RouteErrorKind::Syntax));
    assert_eq!(kind(Router::new().get("/x(", reply(""))), None);
    assert_eq!(
        kind(Router::new().get(r"/u/:id([)", reply(""))),
        Some(RouteErrorKind::InvalidPattern)
    );
    assert_eq!(
        kind(Router::new().get("/a/*", reply("")).unwrap().get("/a/:id", reply(""))),
        Some(RouteErrorKind::Conflict)
    );
    assert_eq!(
        kind(Router::new().get("/a/:id", reply("")).unwrap().get("/a/*", reply(""))),
        Some(RouteErrorKind::Conflict)
    );
    assert_eq!(
        kind(Router::new().get("/x", reply("")).unwrap().get("/x", reply(""))),
        Some(RouteErrorKind::Duplicate)
    );
    // Same path on another method is fine.
    assert_eq!(kind(Router::new().get("/x", reply("")).unwrap().post("/x", reply(""))), None);
}

#[test]
fn route_error_names_the_path() {
    let err = Router::new().get("/a//b", reply("")).err().unwrap();
    assert_eq!(err.path(), "/a//b");
    assert!(err.to_string().starts_with("invalid route `/a//b`"));
}

#[test]
fn frozen_app_exposes_lookup() {
    let app = app();
    let found = app.find_route(&Method::GET, "/user/5").unwrap();
    assert!(found.has_handler());
    assert_eq!(found.route(), Some("/user/:id"));
    assert_eq!(found.param("id"), Some("5"));

    let prefix = app.find_route(&Method::GET, "/a/b").unwrap();
    assert!(!prefix.has_handler());

    assert!(app.routes().contains(&(&Method::POST, "/user/:id")));
}
