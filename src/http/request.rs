use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::http::error::ProtocolError;

/// Header field mapping. Keys are case-sensitive as received; the last
/// occurrence of a key wins.
pub type Fields = HashMap<String, String>;

/// HTTP request methods.
///
/// Only the verbs the server routes on are recognised. Anything else on the
/// request line is a malformed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// DELETE - Delete a resource
    DELETE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        }
    }
}

impl FromStr for Method {
    type Err = ProtocolError;

    /// Parses an HTTP method, case-sensitively.
    ///
    /// ```
    /// # use gridline::http::request::Method;
    /// assert_eq!("GET".parse(), Ok(Method::GET));
    /// assert!("get".parse::<Method>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            _ => Err(ProtocolError::MalformedRequest),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol version carried on the request and status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    Http10,
    #[default]
    Http11,
}

impl Protocol {
    /// The wire token, e.g. `HTTP/1.1`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http10 => "HTTP/1.0",
            Protocol::Http11 => "HTTP/1.1",
        }
    }

    /// Matches the token exactly; `HTTP/1.2` and `http/1.1` are rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HTTP/1.0" => Some(Protocol::Http10),
            "HTTP/1.1" => Some(Protocol::Http11),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request line plus header fields, as read from or written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Raw request target, not decoded (e.g. "/index.html")
    pub url: String,
    /// HTTP version of the request line
    pub protocol: Protocol,
    /// Request headers as key-value pairs
    pub fields: Fields,
}

impl Default for RequestHead {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: "/".to_string(),
            protocol: Protocol::Http11,
            fields: Fields::new(),
        }
    }
}

impl RequestHead {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|v| v.as_str())
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Builder for constructing request heads, mostly on the client side.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    head: RequestHead,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.head.method = method;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.head.url = url.into();
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.head.protocol = protocol;
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.head.fields.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> RequestHead {
        self.head
    }
}
