//! Gridline - minimal HTTP/1.x server toolkit
//!
//! A wire codec, a per-connection session state machine and a middleware
//! router, serving plain HTTP exchanges and handing streams off for
//! protocol upgrades.

pub mod client;
pub mod config;
pub mod http;
pub mod server;
