//! HTTP/1.x protocol implementation.
//!
//! Each accepted connection serves exactly one request/response exchange.
//!
//! # Architecture
//!
//! - **`parser`**: Decodes request lines, status lines and header fields, line by line
//! - **`writer`**: Encodes header blocks as one vectored write
//! - **`io`**: Line reader and the pending vectored write that owns its segments
//! - **`request`** / **`response`**: Plain header values and their builders
//! - **`session`**: Request/response views bound to the connection stream
//! - **`connection`**: The per-connection state machine
//! - **`router`**: Ordered middleware chain and continuation dispatch
//! - **`error`**: Protocol error kinds
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │    Idle     │
//!        └──────┬──────┘
//!               ▼
//!        ┌──────────────────┐   malformed request/field
//!        │  HeaderPending   │ ─────────────────────────┐
//!        └──────┬───────────┘   (400, header only)     │
//!               │ header parsed                        │
//!               ▼                                      │
//!        ┌──────────────────┐                          │
//!        │   Dispatching    │ ← middleware chain runs  │
//!        └──────┬───────────┘                          │
//!               ▼                                      │
//!        ┌──────────────────┐                          │
//!        │  HeaderFlushed   │ ← header written once    │
//!        └──────┬───────────┘                          │
//!               ▼                                      │
//!        ┌──────────────────┐                          │
//!        │     Closed       │ ◄────────────────────────┘
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gridline::http::response::StatusCode;
//! use gridline::http::router::Router;
//! use tokio::net::{TcpListener, TcpStream};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut router = Router::<TcpStream>::new();
//!     router.use_middleware(|res, _req, _next| {
//!         Box::pin(async move {
//!             res.status = StatusCode::NotFound;
//!             res.write(b"Not Found").await?;
//!             Ok(())
//!         })
//!     });
//!
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let (socket, _addr) = listener.accept().await?;
//!     router.handle_connection(socket).await
//! }
//! ```

pub mod connection;
pub mod error;
pub mod io;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod session;
pub mod writer;
