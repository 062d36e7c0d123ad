//! Client side of the codec.
//!
//! Writes a request header with the same vectored writer the server uses and
//! decodes the status line that comes back. A malformed status line is
//! returned as [`ProtocolError::MalformedResponse`](crate::http::error::ProtocolError).

use std::time::Duration;

use anyhow::{Context, Result};
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

use crate::http::io::HeaderLimits;
use crate::http::parser;
use crate::http::request::{Method, RequestHead};
use crate::http::response::ResponseHead;
use crate::http::writer;

/// Default buffer size for reading responses
const BUFFER_SIZE: usize = 8192;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct ClientResponse {
    pub head: ResponseHead,
    pub body: Vec<u8>,
}

/// Sends one request over `stream` and reads the response.
///
/// The body is read up to Content-Length, or to end of stream when the field
/// is missing.
pub async fn send<S>(stream: &mut S, head: &RequestHead, body: &[u8]) -> Result<ClientResponse>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    writer::write_request_head(stream, head).await?;
    if !body.is_empty() {
        stream.write_all(body).await?;
    }
    stream.flush().await?;

    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);
    let head = parser::read_response_head(stream, &mut buffer, HeaderLimits::default()).await?;
    let body = read_body(stream, buffer, head.content_length()).await?;

    tracing::trace!(status = head.status.as_u16(), len = body.len(), "Response received");
    Ok(ClientResponse { head, body })
}

async fn read_body<S>(stream: &mut S, mut buffer: BytesMut, content_length: Option<usize>) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    match content_length {
        Some(len) => {
            while buffer.len() < len {
                buffer.reserve(BUFFER_SIZE.min(len - buffer.len()));
                if stream.read_buf(&mut buffer).await? == 0 {
                    anyhow::bail!("Connection closed before complete body received");
                }
            }
            buffer.truncate(len);
            Ok(buffer.to_vec())
        }
        None => {
            let mut body = buffer.to_vec();
            stream.read_to_end(&mut body).await?;
            Ok(body)
        }
    }
}

/// Connects to `url` and performs one exchange.
pub async fn fetch(method: Method, url: &Url, body: &[u8]) -> Result<ClientResponse> {
    if url.scheme() != "http" {
        anyhow::bail!("unsupported scheme {}", url.scheme());
    }
    let host = url.host_str().context("URL missing host")?;
    let port = url.port_or_known_default().unwrap_or(80);

    let addr = format!("{}:{}", host, port);
    let mut stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr))
        .await
        .context("Connection timeout")?
        .with_context(|| format!("Failed to connect to {}", addr))?;

    let target = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let host_field = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut builder = RequestHead::builder()
        .method(method)
        .url(target)
        .field("Host", host_field)
        .field("Connection", "close");
    if !body.is_empty() {
        builder = builder.field("Content-Length", body.len().to_string());
    }

    send(&mut stream, &builder.build(), body).await
}
