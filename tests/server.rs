use std::time::Duration;

use strata::{Context, Error, Router, Server, health, middleware};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

async fn echo(ctx: Context) -> Context {
    let body = format!(
        "{} {} {}",
        ctx.param("name").unwrap_or("-"),
        ctx.query("greeting").unwrap_or_default(),
        String::from_utf8_lossy(ctx.request().body()),
    );
    ctx.with_response(body)
}

#[tokio::test]
async fn serves_over_tcp_and_shuts_down() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let router = Router::new()
        .with_global_middleware([middleware::trace()])
        .post("/hello/:name", echo)
        .unwrap()
        .get("/healthz", health::liveness)
        .unwrap();

    let server = tokio::spawn(
        Server::from_listener(listener)
            .with_shutdown(async move {
                let _ = stopped.await;
            })
            .serve(router),
    );

    let res = raw_request(
        addr,
        "POST /hello/ada?greeting=hi HTTP/1.1\r\nhost: localhost\r\ncontent-length: 4\r\nconnection: close\r\n\r\nbody",
    )
    .await;
    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert!(res.ends_with("\r\n\r\nada hi body"), "{res}");

    let res = raw_request(addr, "GET /healthz HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n").await;
    assert!(res.ends_with("\r\n\r\nok"), "{res}");

    let res = raw_request(addr, "GET /nope HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n").await;
    assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"), "{res}");
    assert!(res.ends_with("\r\n\r\nNot Found"), "{res}");

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn invalid_address_is_an_error() {
    let err = Server::bind("not an address").serve(Router::new()).await.unwrap_err();
    assert!(matches!(err, Error::Addr(ref addr) if addr == "not an address"));
}
