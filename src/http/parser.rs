use bytes::BytesMut;
use tokio::io::AsyncRead;

use crate::http::error::{Error, ProtocolError};
use crate::http::io::{HeaderLimits, header_too_large, read_line};
use crate::http::request::{Fields, Method, Protocol, RequestHead};
use crate::http::response::{ResponseHead, StatusCode};

/// Parses `<VERB> <url> <protocol>`.
///
/// Exactly three space-separated tokens are accepted. The URL is opaque.
pub fn parse_request_line(line: &str) -> Result<(Method, &str, Protocol), ProtocolError> {
    let mut parts = line.split(' ');
    let (Some(method), Some(url), Some(protocol), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ProtocolError::MalformedRequest);
    };

    let method = method.parse::<Method>()?;
    let protocol = Protocol::from_token(protocol).ok_or(ProtocolError::MalformedRequest)?;

    Ok((method, url, protocol))
}

/// Parses `HTTP/1.<0|1> <3 digits>[ <reason>]`.
///
/// The reason phrase is ignored. Codes without a name are kept as
/// [`StatusCode::Other`].
pub fn parse_status_line(line: &str) -> Result<(Protocol, StatusCode), ProtocolError> {
    let bytes = line.as_bytes();
    if bytes.len() < 12 || !line.starts_with("HTTP/1.") {
        return Err(ProtocolError::MalformedResponse);
    }

    let protocol = match bytes[7] {
        b'0' => Protocol::Http10,
        b'1' => Protocol::Http11,
        _ => return Err(ProtocolError::MalformedResponse),
    };

    if bytes[8] != b' ' {
        return Err(ProtocolError::MalformedResponse);
    }

    let digits = &bytes[9..12];
    if !digits.iter().all(u8::is_ascii_digit) || bytes.get(12).is_some_and(|b| *b != b' ') {
        return Err(ProtocolError::MalformedResponse);
    }
    let code = digits
        .iter()
        .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));

    Ok((protocol, StatusCode::from_u16(code)))
}

/// Splits a header line on the first `": "`. The value is kept verbatim.
pub fn parse_field(line: &str) -> Result<(&str, &str), ProtocolError> {
    line.split_once(": ").ok_or(ProtocolError::MalformedField)
}

/// Reads a request line and its header fields.
///
/// Anything already buffered past the blank line stays in `buf`. A header
/// block larger than `limits.max_header` fails with
/// [`io::ErrorKind::InvalidData`](std::io::ErrorKind::InvalidData).
pub async fn read_request_head<R>(
    stream: &mut R,
    buf: &mut BytesMut,
    limits: HeaderLimits,
) -> Result<RequestHead, Error>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut budget = limits.max_header;
    let line = read_line(stream, buf, limits.max_line).await?;
    charge(&mut budget, line.len())?;
    let line = std::str::from_utf8(&line).map_err(|_| ProtocolError::MalformedRequest)?;
    let (method, url, protocol) = parse_request_line(line)?;

    let mut head = RequestHead {
        method,
        url: url.to_string(),
        protocol,
        fields: Fields::new(),
    };
    read_fields(stream, buf, &mut head.fields, limits.max_line, budget).await?;

    Ok(head)
}

/// Reads a status line and its header fields.
pub async fn read_response_head<R>(
    stream: &mut R,
    buf: &mut BytesMut,
    limits: HeaderLimits,
) -> Result<ResponseHead, Error>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut budget = limits.max_header;
    let line = read_line(stream, buf, limits.max_line).await?;
    charge(&mut budget, line.len())?;
    let line = std::str::from_utf8(&line).map_err(|_| ProtocolError::MalformedResponse)?;
    let (protocol, status) = parse_status_line(line)?;

    let mut head = ResponseHead {
        protocol,
        status,
        fields: Fields::new(),
    };
    read_fields(stream, buf, &mut head.fields, limits.max_line, budget).await?;

    Ok(head)
}

// Deducts one line plus its terminator from what is left of the header block.
fn charge(budget: &mut usize, line_len: usize) -> Result<(), Error> {
    *budget = budget
        .checked_sub(line_len + 2)
        .ok_or_else(header_too_large)?;
    Ok(())
}

async fn read_fields<R>(
    stream: &mut R,
    buf: &mut BytesMut,
    fields: &mut Fields,
    max_line: usize,
    mut budget: usize,
) -> Result<(), Error>
where
    R: AsyncRead + Unpin + ?Sized,
{
    loop {
        let line = read_line(stream, buf, max_line.min(budget)).await?;
        charge(&mut budget, line.len())?;
        if line.is_empty() {
            return Ok(());
        }

        let line = std::str::from_utf8(&line).map_err(|_| ProtocolError::MalformedField)?;
        let (key, value) = parse_field(line)?;
        fields.insert(key.to_string(), value.to_string());
    }
}
