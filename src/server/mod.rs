//! TCP acceptor feeding connections to a router.

pub mod listener;
