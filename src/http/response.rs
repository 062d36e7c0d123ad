use crate::http::request::{Fields, Protocol};

/// HTTP status codes.
///
/// The server only names the codes it produces itself. Any other three-digit
/// code read off a status line is kept as `Other` so the numeric value
/// survives, even though it has no reason phrase of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusCode {
    /// 200 OK
    #[default]
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// Any other code.
    Other(u16),
}

impl StatusCode {
    pub fn from_u16(code: u16) -> Self {
        match code {
            200 => StatusCode::Ok,
            400 => StatusCode::BadRequest,
            404 => StatusCode::NotFound,
            other => StatusCode::Other(other),
        }
    }

    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use gridline::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Other(302).as_u16(), 302);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::Other(code) => *code,
        }
    }

    /// Returns the reason phrase, or `None` for codes without a named one.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        match self {
            StatusCode::Ok => Some("OK"),
            StatusCode::BadRequest => Some("Bad Request"),
            StatusCode::NotFound => Some("Not Found"),
            StatusCode::Other(_) => None,
        }
    }

    /// The status segment as it goes on the wire, line terminator included.
    ///
    /// Codes without a reason phrase are written as `501 Not Implemented`;
    /// the stored numeric value is left untouched.
    pub fn wire_text(&self) -> &'static str {
        match self {
            StatusCode::Ok => "200 OK\r\n",
            StatusCode::BadRequest => "400 Bad Request\r\n",
            StatusCode::NotFound => "404 Not Found\r\n",
            StatusCode::Other(_) => "501 Not Implemented\r\n",
        }
    }
}

/// The status line plus header fields of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// HTTP version of the status line
    pub protocol: Protocol,
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers as key-value pairs
    pub fields: Fields,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|v| v.as_str())
    }

    pub fn set_content_length(&mut self, length: usize) {
        self.fields
            .insert("Content-Length".to_string(), length.to_string());
    }

    pub fn set_content_type(&mut self, mime_type: impl Into<String>) {
        self.fields
            .insert("Content-Type".to_string(), mime_type.into());
    }

    /// Parsed Content-Length, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
    }
}
