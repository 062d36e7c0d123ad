//! Request and response views over one accepted connection.
//!
//! Both views share the connection's stream. Only the connection's own task
//! ever touches them, so the lock is never contended; it exists so that a
//! handler can hold `&mut Response` and `&mut Request` at the same time and
//! so the stream can be taken out exactly once for a protocol upgrade.

use std::io;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::http::error::Error;
use crate::http::io::{HeaderLimits, READ_CHUNK};
use crate::http::parser;
use crate::http::request::RequestHead;
use crate::http::response::ResponseHead;
use crate::http::writer;

type SharedStream<S> = Arc<Mutex<Option<S>>>;

fn detached() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "stream was taken from the session")
}

/// Creates the request/response pair for a freshly accepted stream.
pub(crate) fn pair<S>(stream: S) -> (Request<S>, Response<S>) {
    let stream = Arc::new(Mutex::new(Some(stream)));
    let request = Request {
        head: RequestHead::default(),
        body: BytesMut::new(),
        stream: stream.clone(),
    };
    let response = Response {
        head: ResponseHead::default(),
        header_written: false,
        stream,
    };
    (request, response)
}

/// The inbound side of a connection.
///
/// Dereferences to [`RequestHead`] for the method, URL, protocol and fields.
pub struct Request<S> {
    head: RequestHead,
    /// Bytes received after the header. Filled further by [`Request::read_body`].
    pub body: BytesMut,
    stream: SharedStream<S>,
}

impl<S> Deref for Request<S> {
    type Target = RequestHead;

    fn deref(&self) -> &RequestHead {
        &self.head
    }
}

impl<S> DerefMut for Request<S> {
    fn deref_mut(&mut self) -> &mut RequestHead {
        &mut self.head
    }
}

impl<S> Request<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub(crate) async fn read_head(&mut self, limits: HeaderLimits) -> Result<(), Error> {
        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or_else(detached)?;
        self.head = parser::read_request_head(stream, &mut self.body, limits).await?;
        Ok(())
    }

    /// Reads from the connection until `body` holds `Content-Length` bytes.
    ///
    /// Without a Content-Length field nothing is read. The buffer grows with
    /// the bytes actually received, never up front to the announced length.
    /// Returns the number of bytes read by this call.
    pub async fn read_body(&mut self) -> io::Result<usize> {
        let want = self.head.content_length();
        if self.body.len() >= want {
            return Ok(0);
        }

        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or_else(detached)?;

        let mut read = 0;
        while self.body.len() < want {
            self.body.reserve(READ_CHUNK.min(want - self.body.len()));
            let n = stream.read_buf(&mut self.body).await?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before end of body",
                ));
            }
            read += n;
        }
        Ok(read)
    }

    /// Takes the connection stream out of the session, e.g. to upgrade it to
    /// another protocol.
    ///
    /// Succeeds once. Afterwards every read or write through this request or
    /// its response fails with [`io::ErrorKind::NotConnected`], and the
    /// session no longer flushes a response header.
    pub async fn take_stream(&mut self) -> io::Result<S> {
        self.stream.lock().await.take().ok_or_else(detached)
    }
}

/// The outbound side of a connection.
///
/// Dereferences to [`ResponseHead`]; status and fields can be changed freely
/// until the header is written, after which changes never reach the peer.
pub struct Response<S> {
    head: ResponseHead,
    header_written: bool,
    stream: SharedStream<S>,
}

impl<S> Deref for Response<S> {
    type Target = ResponseHead;

    fn deref(&self) -> &ResponseHead {
        &self.head
    }
}

impl<S> DerefMut for Response<S> {
    fn deref_mut(&mut self) -> &mut ResponseHead {
        &mut self.head
    }
}

impl<S> Response<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// Whether the header has been sent, or an attempt to send it failed.
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Transmits the status line and fields.
    ///
    /// The header goes out at most once. A failed write may already have put
    /// part of it on the wire, so it is not retried; the connection is unusable
    /// after that error.
    pub async fn write_header(&mut self) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }

        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or_else(detached)?;
        self.header_written = true;
        writer::write_response_head(stream, &self.head).await?;
        Ok(())
    }

    /// Writes body bytes, sending the header first if it has not gone out yet.
    pub async fn write(&mut self, body: &[u8]) -> io::Result<usize> {
        self.write_header().await?;

        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or_else(detached)?;
        stream.write_all(body).await?;
        Ok(body.len())
    }

    pub(crate) async fn stream_taken(&self) -> bool {
        self.stream.lock().await.is_none()
    }

    /// Shuts the write side down, unless the stream was taken.
    pub(crate) async fn close(&mut self) -> io::Result<()> {
        match self.stream.lock().await.as_mut() {
            Some(stream) => stream.shutdown().await,
            None => Ok(()),
        }
    }
}
