//! Courier - a client-side coordinator for asynchronous SQL execution
//! against remote, stateful database sessions.
//!
//! Statements are submitted to an opaque "execute" endpoint, gated on the
//! server's governance findings, and their results polled from a "poll"
//! endpoint until completion, with cancellation and per-session teardown.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod gate;
pub mod logging;
pub mod poll;
pub mod registry;
pub mod remote;
pub mod results;
pub mod session;
pub mod submit;
