use gridline::client::{self, ClientResponse};
use gridline::http::error::{Error, ProtocolError};
use gridline::http::request::{Method, RequestHead};
use gridline::http::response::StatusCode;
use gridline::http::router::Router;
use gridline::server::listener;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use url::Url;

async fn start_server() -> String {
    let mut router = Router::<TcpStream>::new();
    router.use_exact("/hello", |res, _req, _next| {
        Box::pin(async move {
            res.set_content_type("text/plain");
            res.set_content_length(5);
            res.write(b"hello").await?;
            Ok(())
        })
    });
    router.use_exact("/echo", |res, req, _next| {
        Box::pin(async move {
            req.read_body().await?;
            let body = req.body.clone();
            res.set_content_length(body.len());
            res.write(&body).await?;
            Ok(())
        })
    });
    router.use_middleware(|res, _req, _next| {
        Box::pin(async move {
            res.status = StatusCode::NotFound;
            res.write(b"Not Found").await?;
            Ok(())
        })
    });

    let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(listener::serve(socket, router));
    format!("http://{}", addr)
}

async fn get(base: &str, path: &str) -> ClientResponse {
    let url = Url::parse(&format!("{}{}", base, path)).unwrap();
    client::fetch(Method::GET, &url, b"").await.unwrap()
}

#[tokio::test]
async fn test_fetch_with_content_length() {
    let base = start_server().await;

    let resp = get(&base, "/hello").await;

    assert_eq!(resp.head.status, StatusCode::Ok);
    assert_eq!(resp.head.header("Content-Type"), Some("text/plain"));
    assert_eq!(resp.head.content_length(), Some(5));
    assert_eq!(resp.body, b"hello");
}

#[tokio::test]
async fn test_fetch_body_until_close() {
    let base = start_server().await;

    let resp = get(&base, "/missing").await;

    assert_eq!(resp.head.status, StatusCode::NotFound);
    assert_eq!(resp.head.content_length(), None);
    assert_eq!(resp.body, b"Not Found");
}

#[tokio::test]
async fn test_fetch_posts_body() {
    let base = start_server().await;
    let url = Url::parse(&format!("{}/echo", base)).unwrap();

    let resp = client::fetch(Method::POST, &url, b"{\"id\":7}").await.unwrap();

    assert_eq!(resp.head.status, StatusCode::Ok);
    assert_eq!(resp.body, b"{\"id\":7}");
}

#[tokio::test]
async fn test_fetch_concurrent_connections() {
    let base = start_server().await;

    let (a, b, c) = tokio::join!(get(&base, "/hello"), get(&base, "/nope"), get(&base, "/hello"));

    assert_eq!(a.body, b"hello");
    assert_eq!(b.head.status, StatusCode::NotFound);
    assert_eq!(c.body, b"hello");
}

#[tokio::test]
async fn test_fetch_rejects_other_schemes() {
    let url = Url::parse("https://127.0.0.1/").unwrap();

    let err = client::fetch(Method::GET, &url, b"").await.unwrap_err();

    assert!(err.to_string().contains("unsupported scheme"));
}

#[tokio::test]
async fn test_send_reports_malformed_status_line() {
    let (mut client_side, mut server_side) = tokio::io::duplex(4096);
    server_side.write_all(b"HTTP/1.1 20 OK\r\n\r\n").await.unwrap();

    let head = RequestHead::builder().url("/").build();
    let err = client::send(&mut client_side, &head, b"").await.unwrap_err();

    let err = err.downcast_ref::<Error>().expect("codec error");
    assert_eq!(err.protocol(), Some(ProtocolError::MalformedResponse));
}

#[tokio::test]
async fn test_send_reports_truncated_body() {
    let (mut client_side, mut server_side) = tokio::io::duplex(4096);
    server_side
        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort")
        .await
        .unwrap();
    server_side.shutdown().await.unwrap();

    let head = RequestHead::builder().url("/").build();
    let err = client::send(&mut client_side, &head, b"").await.unwrap_err();

    assert!(err.to_string().contains("Connection closed"));
}
