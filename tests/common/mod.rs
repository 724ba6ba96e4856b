//! Integration test common infrastructure.
//!
//! Provides a scripted mock IRC server for bots to connect to, plus
//! configuration helpers aimed at it.

pub mod server;

#[allow(unused_imports)]
pub use server::{test_config, MockServer, ServerConn, RECV_TIMEOUT};
