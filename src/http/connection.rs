use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::http::io::HeaderLimits;
use crate::http::response::StatusCode;
use crate::http::session::{self, Request, Response};

/// Whatever runs between reading the request header and flushing the
/// response header. The [`Router`](crate::http::router::Router) is the usual
/// implementation.
pub trait Dispatch<S>: Send + Sync {
    fn dispatch<'a>(
        &'a self,
        res: &'a mut Response<S>,
        req: &'a mut Request<S>,
    ) -> BoxFuture<'a, anyhow::Result<()>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    HeaderPending,
    Dispatching,
    HeaderFlushed,
    Closed,
}

/// One accepted connection, serving exactly one request/response exchange.
pub struct Connection<S> {
    request: Request<S>,
    response: Response<S>,
    state: ConnectionState,
    limits: HeaderLimits,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        let (request, response) = session::pair(stream);
        Self {
            request,
            response,
            state: ConnectionState::Idle,
            limits: HeaderLimits::default(),
        }
    }

    /// Longest header line accepted from the peer.
    pub fn max_line_length(mut self, max_line: usize) -> Self {
        self.limits.max_line = max_line;
        self
    }

    /// Largest request header block accepted from the peer, all lines
    /// included.
    pub fn max_header_bytes(mut self, max_header: usize) -> Self {
        self.limits.max_header = max_header;
        self
    }

    pub fn limits(mut self, limits: HeaderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn request(&self) -> &Request<S> {
        &self.request
    }

    pub fn response(&self) -> &Response<S> {
        &self.response
    }

    /// Drives the connection from `Idle` to `Closed`.
    ///
    /// Malformed requests are answered with a bare 400 and never reach the
    /// dispatcher. Other header read failures are returned. A response header
    /// is always written before the connection is considered serviced, even
    /// if the dispatcher fails, unless the dispatcher took the stream.
    pub async fn run<D>(&mut self, dispatcher: &D) -> anyhow::Result<()>
    where
        D: Dispatch<S> + ?Sized,
    {
        let mut outcome = Ok(());

        loop {
            match self.state {
                ConnectionState::Idle => {
                    self.state = ConnectionState::HeaderPending;
                }

                ConnectionState::HeaderPending => match self.request.read_head(self.limits).await {
                    Ok(()) => {
                        self.state = ConnectionState::Dispatching;
                    }
                    Err(e) if e.is_bad_request() => {
                        debug!(error = %e, "rejecting malformed request");
                        self.state = ConnectionState::Closed;
                        self.response.status = StatusCode::BadRequest;
                        self.response.write_header().await?;
                    }
                    Err(e) => {
                        self.state = ConnectionState::Closed;
                        return Err(e.into());
                    }
                },

                ConnectionState::Dispatching => {
                    self.response.protocol = self.request.protocol;
                    outcome = dispatcher
                        .dispatch(&mut self.response, &mut self.request)
                        .await;
                    self.state = ConnectionState::HeaderFlushed;
                }

                ConnectionState::HeaderFlushed => {
                    self.state = ConnectionState::Closed;
                    if self.response.stream_taken().await {
                        debug!(url = %self.request.url, "stream taken by handler, skipping header flush");
                    } else {
                        self.response.write_header().await?;
                    }
                }

                ConnectionState::Closed => break,
            }
        }

        if let Err(e) = self.response.close().await {
            warn!(error = %e, "failed to shut down connection");
        }

        outcome
    }
}
