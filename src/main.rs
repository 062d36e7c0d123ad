use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tokio_tungstenite::tungstenite::protocol::Role;
use tracing::{info, warn};

use gridline::config::Config;
use gridline::http::response::StatusCode;
use gridline::http::router::Router;
use gridline::http::session::{Request, Response};
use gridline::server;

const INDEX_HTML: &str = "<!doctype html>\n<title>gridline</title>\n<p>Hello from gridline</p>\n";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let router = build_router()
        .max_line_length(cfg.max_line_length)
        .max_header_bytes(cfg.max_header_bytes);

    tokio::select! {
        res = server::listener::run(&cfg, router) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn build_router() -> Router<TcpStream> {
    let mut router = Router::<TcpStream>::new();

    router.use_middleware(|res, req, next| {
        Box::pin(async move {
            info!(method = %req.method, url = %req.url, "Incoming request");
            next.run(res, req).await?;
            info!(status = res.status.as_u16(), "Outgoing response");
            Ok(())
        })
    });

    router.use_exact("/", |res, req, next| {
        Box::pin(async move {
            req.url = "/index.html".to_string();
            next.run(res, req).await
        })
    });

    router.use_exact("/index.html", |res, _req, _next| {
        Box::pin(async move {
            res.set_content_type("text/html; charset=utf-8");
            res.set_content_length(INDEX_HTML.len());
            res.write(INDEX_HTML.as_bytes()).await?;
            Ok(())
        })
    });

    router.use_exact("/ws", |res, req, _next| Box::pin(websocket_echo(res, req)));

    router.use_middleware(|res, _req, _next| {
        Box::pin(async move {
            res.status = StatusCode::NotFound;
            res.write(b"Not Found").await?;
            Ok(())
        })
    });

    router
}

/// Upgrades the connection and echoes every data frame back.
async fn websocket_echo(
    res: &mut Response<TcpStream>,
    req: &mut Request<TcpStream>,
) -> anyhow::Result<()> {
    let Some(key) = req.header("Sec-WebSocket-Key") else {
        res.status = StatusCode::BadRequest;
        return Ok(());
    };
    let accept = derive_accept_key(key.as_bytes());

    let mut stream = req.take_stream().await?;

    // 101 has no reason phrase in the codec, so the handshake goes out raw
    let handshake = format!(
        "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: {}\r\n\r\n",
        accept
    );
    stream
        .write_all(handshake.as_bytes())
        .await
        .context("failed to send WebSocket handshake")?;

    let mut ws = WebSocketStream::from_raw_socket(stream, Role::Server, None).await;
    tokio::spawn(async move {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(msg) if msg.is_text() || msg.is_binary() => {
                    if let Err(e) = ws.send(msg).await {
                        warn!(error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Ok(msg) if msg.is_close() => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "WebSocket read failed");
                    break;
                }
            }
        }
    });

    Ok(())
}
