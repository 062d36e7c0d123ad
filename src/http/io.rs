//! Stream helpers shared by the codec and the session.
//!
//! [`read_line`] pulls `\r\n`-terminated lines off a non-blocking stream
//! through a reusable buffer. [`VectoredWrite`] is a pending scatter/gather
//! write that owns its segment array (and anything else handed to it) until
//! the write completes.

use std::future::Future;
use std::io::{self, IoSlice};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

/// Longest header line accepted before giving up on the peer.
pub const DEFAULT_MAX_LINE: usize = 8 * 1024;

/// Largest complete header block (start line and fields) accepted.
pub const DEFAULT_MAX_HEADER: usize = 64 * 1024;

pub(crate) const READ_CHUNK: usize = 1024;

/// Size caps applied while decoding a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLimits {
    pub max_line: usize,
    /// Counts every line including its `\r\n`.
    pub max_header: usize,
}

impl Default for HeaderLimits {
    fn default() -> Self {
        Self {
            max_line: DEFAULT_MAX_LINE,
            max_header: DEFAULT_MAX_HEADER,
        }
    }
}

/// Reads one line terminated by `\r\n` and returns it with the terminator
/// stripped. Bytes past the terminator stay in `buf` for the next call.
pub async fn read_line<R>(stream: &mut R, buf: &mut BytesMut, max_len: usize) -> io::Result<BytesMut>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut searched = 0;
    loop {
        if let Some(pos) = find_crlf(&buf[searched..]) {
            let end = searched + pos;
            if end > max_len {
                return Err(line_too_long());
            }
            let mut line = buf.split_to(end + 2);
            line.truncate(end);
            return Ok(line);
        }
        // a '\r' at the very end may still pair with the next read
        searched = buf.len().saturating_sub(1);

        if buf.len() > max_len {
            return Err(line_too_long());
        }

        buf.reserve(READ_CHUNK);
        if stream.read_buf(buf).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before end of header",
            ));
        }
    }
}

fn line_too_long() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "header line too long")
}

pub(crate) fn header_too_large() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "header block too large")
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// A vectored write in flight.
///
/// The descriptor array is allocated once by the caller and moved in here.
/// The segments may borrow from header maps or bodies for `'a`, so the
/// borrow checker keeps that data alive for as long as the write is pending.
/// Extra owned values (`O`) ride along and are released together with the
/// descriptor array the moment the write completes, successfully or not.
#[must_use = "futures do nothing unless polled"]
pub struct VectoredWrite<'a, W: ?Sized, O = ()> {
    writer: &'a mut W,
    segments: Box<[IoSlice<'a>]>,
    start: usize,
    written: usize,
    owned: Option<O>,
}

impl<'a, W> VectoredWrite<'a, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    pub fn new(writer: &'a mut W, segments: Box<[IoSlice<'a>]>) -> Self {
        Self::with_owned(writer, segments, ())
    }
}

impl<'a, W, O> VectoredWrite<'a, W, O>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    /// Like [`VectoredWrite::new`], additionally holding `owned` until
    /// completion. Use a tuple to hold several values.
    pub fn with_owned(writer: &'a mut W, segments: Box<[IoSlice<'a>]>, owned: O) -> Self {
        Self {
            writer,
            segments,
            start: 0,
            written: 0,
            owned: Some(owned),
        }
    }

    /// Number of segments still to be written, including a partially
    /// written one.
    pub fn remaining_segments(&self) -> usize {
        self.segments.len() - self.start
    }

    fn complete(&mut self, result: io::Result<usize>) -> Poll<io::Result<usize>> {
        self.segments = Box::default();
        self.start = 0;
        drop(self.owned.take());
        Poll::Ready(result)
    }
}

impl<W, O> Future for VectoredWrite<'_, W, O>
where
    W: AsyncWrite + Unpin + ?Sized,
    O: Unpin,
{
    type Output = io::Result<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            while this.start < this.segments.len() && this.segments[this.start].is_empty() {
                this.start += 1;
            }
            if this.start == this.segments.len() {
                return this.complete(Ok(this.written));
            }

            let n = match Pin::new(&mut *this.writer)
                .poll_write_vectored(cx, &this.segments[this.start..])
            {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(0)) => {
                    return this.complete(Err(io::ErrorKind::WriteZero.into()));
                }
                Poll::Ready(Ok(n)) => n,
                Poll::Ready(Err(e)) => return this.complete(Err(e)),
            };
            this.written += n;

            let remaining = {
                let mut rest = &mut this.segments[this.start..];
                IoSlice::advance_slices(&mut rest, n);
                rest.len()
            };
            this.start = this.segments.len() - remaining;
        }
    }
}
