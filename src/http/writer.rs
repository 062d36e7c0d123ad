use std::io::IoSlice;

use tokio::io::AsyncWrite;

use crate::http::io::VectoredWrite;
use crate::http::request::{Fields, Method, Protocol, RequestHead};
use crate::http::response::ResponseHead;

const FIELD_SEPARATOR: &[u8] = b": ";
const CRLF: &[u8] = b"\r\n";

/// Segments for a header block: the start line tokens, four per field
/// (key, `": "`, value, `\r\n`) and the closing `\r\n`.
pub fn segment_count(start_line_segments: usize, field_count: usize) -> usize {
    start_line_segments + 4 * field_count + 1
}

fn verb_token(method: Method) -> &'static str {
    match method {
        Method::GET => "GET ",
        Method::POST => "POST ",
        Method::PUT => "PUT ",
        Method::PATCH => "PATCH ",
        Method::DELETE => "DELETE ",
    }
}

fn request_protocol_token(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::Http10 => " HTTP/1.0\r\n",
        Protocol::Http11 => " HTTP/1.1\r\n",
    }
}

fn response_protocol_token(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::Http10 => "HTTP/1.0 ",
        Protocol::Http11 => "HTTP/1.1 ",
    }
}

fn header_segments<'a>(start_line: &[&'a [u8]], fields: &'a Fields) -> Box<[IoSlice<'a>]> {
    let count = segment_count(start_line.len(), fields.len());
    let mut segments = Vec::with_capacity(count);

    segments.extend(start_line.iter().map(|s| IoSlice::new(*s)));
    for (key, value) in fields {
        segments.push(IoSlice::new(key.as_bytes()));
        segments.push(IoSlice::new(FIELD_SEPARATOR));
        segments.push(IoSlice::new(value.as_bytes()));
        segments.push(IoSlice::new(CRLF));
    }
    segments.push(IoSlice::new(CRLF));

    debug_assert_eq!(segments.len(), count);
    segments.into_boxed_slice()
}

/// `<VERB> ` / `<url>` / ` <protocol>\r\n`, then the fields.
pub fn request_segments(head: &RequestHead) -> Box<[IoSlice<'_>]> {
    header_segments(
        &[
            verb_token(head.method).as_bytes(),
            head.url.as_bytes(),
            request_protocol_token(head.protocol).as_bytes(),
        ],
        &head.fields,
    )
}

/// `<protocol> ` / `<code> <reason>\r\n`, then the fields.
pub fn response_segments(head: &ResponseHead) -> Box<[IoSlice<'_>]> {
    header_segments(
        &[
            response_protocol_token(head.protocol).as_bytes(),
            head.status.wire_text().as_bytes(),
        ],
        &head.fields,
    )
}

/// Writes a request header in a single vectored write.
pub fn write_request_head<'a, W>(writer: &'a mut W, head: &'a RequestHead) -> VectoredWrite<'a, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    VectoredWrite::new(writer, request_segments(head))
}

/// Writes a response header in a single vectored write.
pub fn write_response_head<'a, W>(writer: &'a mut W, head: &'a ResponseHead) -> VectoredWrite<'a, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    VectoredWrite::new(writer, response_segments(head))
}

/// Concatenates the segments of a response header. Meant for logs and tests;
/// the connection path never builds this buffer.
pub fn encode_response_head(head: &ResponseHead) -> Vec<u8> {
    response_segments(head)
        .iter()
        .flat_map(|s| s.iter().copied())
        .collect()
}

/// See [`encode_response_head`].
pub fn encode_request_head(head: &RequestHead) -> Vec<u8> {
    request_segments(head)
        .iter()
        .flat_map(|s| s.iter().copied())
        .collect()
}
