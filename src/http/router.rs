//! Middleware chain dispatch.
//!
//! A [`Router`] is an ordered list of `(predicate, handler)` entries. A request
//! walks the list in registration order; each matching handler receives a
//! [`Next`] continuation for the rest of the list and decides whether the
//! chain goes on. A handler that returns without calling `next` ends the
//! chain there.
//!
//! ```text
//!  entries:  [isolate_errors] [log] [prefix /api] [exact /] [catch-all]
//!  request /:      run ────────► run ──► (skip) ───► run ──► (stopped)
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::error;

use crate::http::connection::{Connection, Dispatch};
use crate::http::io::HeaderLimits;
use crate::http::session::{Request, Response};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// A continuation was invoked but no later entry matched. The chain
    /// lacks a terminal catch-all handler.
    #[error("no middleware left to handle {url}")]
    ChainExhausted { url: String },

    #[error("handler panicked: {0}")]
    Panicked(String),
}

type Predicate<S> = Box<dyn Fn(&Request<S>) -> bool + Send + Sync>;

type Handler<S> = Box<
    dyn for<'a> Fn(&'a mut Response<S>, &'a mut Request<S>, Next<'a, S>) -> BoxFuture<'a, anyhow::Result<()>>
        + Send
        + Sync,
>;

struct Middleware<S> {
    predicate: Predicate<S>,
    handler: Handler<S>,
}

/// The rest of the middleware chain.
///
/// Calling [`Next::run`] twice runs the remainder twice.
pub struct Next<'a, S> {
    entries: &'a [Middleware<S>],
}

impl<S> Clone for Next<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Next<'_, S> {}

impl<'a, S> Next<'a, S> {
    /// Runs the first remaining entry whose predicate matches the request.
    ///
    /// Fails with [`DispatchError::ChainExhausted`] when nothing matches.
    pub fn run<'b>(
        self,
        res: &'b mut Response<S>,
        req: &'b mut Request<S>,
    ) -> BoxFuture<'b, anyhow::Result<()>>
    where
        'a: 'b,
    {
        match self.entries.iter().position(|m| (m.predicate)(&*req)) {
            Some(pos) => {
                let next = Next {
                    entries: &self.entries[pos + 1..],
                };
                (self.entries[pos].handler)(res, req, next)
            }
            None => {
                let url = req.url.clone();
                let err = anyhow::Error::from(DispatchError::ChainExhausted { url });
                Box::pin(async move { Err(err) })
            }
        }
    }

    /// Entries left after this point, matching or not.
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

/// Ordered middleware chain plus the connection entry point.
///
/// Build it completely before accepting connections; registration takes
/// `&mut self`, so a router shared across tasks is read-only.
pub struct Router<S> {
    entries: Vec<Middleware<S>>,
    limits: HeaderLimits,
}

impl<S> Router<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Creates a router whose first entry isolates failures of the rest of
    /// the chain: they are logged and never reach the acceptor.
    pub fn new() -> Self {
        let mut router = Self {
            entries: Vec::new(),
            limits: HeaderLimits::default(),
        };
        router.use_middleware(isolate_errors);
        router
    }

    /// Longest header line accepted from a peer.
    pub fn max_line_length(mut self, max_line: usize) -> Self {
        self.limits.max_line = max_line;
        self
    }

    /// Largest request header block accepted from a peer.
    pub fn max_header_bytes(mut self, max_header: usize) -> Self {
        self.limits.max_header = max_header;
        self
    }

    /// Appends a handler that runs for every request.
    pub fn use_middleware<H>(&mut self, handler: H) -> &mut Self
    where
        H: for<'a> Fn(&'a mut Response<S>, &'a mut Request<S>, Next<'a, S>) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.push(Box::new(|_: &Request<S>| true), Box::new(handler))
    }

    /// Appends a handler for requests whose URL starts with `prefix`.
    pub fn use_prefix<H>(&mut self, prefix: impl Into<String>, handler: H) -> &mut Self
    where
        H: for<'a> Fn(&'a mut Response<S>, &'a mut Request<S>, Next<'a, S>) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        let prefix = prefix.into();
        self.push(
            Box::new(move |req: &Request<S>| req.url.starts_with(prefix.as_str())),
            Box::new(handler),
        )
    }

    /// Appends a handler for requests whose URL is exactly `path`.
    pub fn use_exact<H>(&mut self, path: impl Into<String>, handler: H) -> &mut Self
    where
        H: for<'a> Fn(&'a mut Response<S>, &'a mut Request<S>, Next<'a, S>) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        let path = path.into();
        self.push(
            Box::new(move |req: &Request<S>| req.url == path),
            Box::new(handler),
        )
    }

    fn push(&mut self, predicate: Predicate<S>, handler: Handler<S>) -> &mut Self {
        self.entries.push(Middleware { predicate, handler });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Services one accepted connection: reads the request header, runs the
    /// chain and makes sure a response header went out.
    pub async fn handle_connection(&self, stream: S) -> anyhow::Result<()> {
        Connection::new(stream)
            .limits(self.limits)
            .run(self)
            .await
    }
}

impl<S> Default for Router<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Dispatch<S> for Router<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    fn dispatch<'a>(
        &'a self,
        res: &'a mut Response<S>,
        req: &'a mut Request<S>,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        Next {
            entries: &self.entries,
        }
        .run(res, req)
    }
}

fn isolate_errors<'a, S>(
    res: &'a mut Response<S>,
    req: &'a mut Request<S>,
    next: Next<'a, S>,
) -> BoxFuture<'a, anyhow::Result<()>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    Box::pin(async move {
        let url = req.url.clone();
        let outcome = match AssertUnwindSafe(next.run(res, req)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(DispatchError::Panicked(panic_message(payload.as_ref())).into()),
        };

        if let Err(e) = outcome {
            error!(url = %url, error = %e, "error while handling HTTP connection");
        }
        Ok(())
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
