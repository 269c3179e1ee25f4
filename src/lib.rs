//! numsort: a TCP client/server pair for sorting integer batches.
//!
//! The wire protocol is newline-delimited text: the client sends one line of
//! comma-separated integers, the server replies with the same integers
//! sorted ascending, or an `ERROR:`-prefixed line on a malformed request.
//! Exactly one request/response pair per connection.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
