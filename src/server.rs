//! TCP server for sorting integer batches.
//!
//! Accepts connections in an unbounded loop and hands each one to its own
//! task. A handler owns exactly one connection: it reads a single request
//! line under a read deadline, sorts the decoded integers, writes the
//! response under a write deadline, and closes the socket.

use crate::config::ServerConfig;
use crate::error::HandlerError;
use crate::protocol;
use bytes::{Buf, BytesMut};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Read buffer size
const BUFFER_SIZE: usize = 16 * 1024;

/// Process-wide counters, kept for observability only.
///
/// Never consulted for protocol decisions; incremented with relaxed atomics
/// since the values are only ever read for logging.
#[derive(Debug, Default)]
pub struct ServerStats {
    clients_accepted: AtomicU64,
    requests_processed: AtomicU64,
}

impl ServerStats {
    /// Record an accepted connection, returning its ordinal client number.
    fn next_client(&self) -> u64 {
        self.clients_accepted.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn record_request(&self) {
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn clients_accepted(&self) -> u64 {
        self.clients_accepted.load(Ordering::Relaxed)
    }

    pub fn requests_processed(&self) -> u64 {
        self.requests_processed.load(Ordering::Relaxed)
    }
}

/// Server instance
pub struct Server {
    listener: TcpListener,
    stats: Arc<ServerStats>,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl Server {
    /// Bind the listener. A bind failure here is fatal to the process;
    /// the caller propagates it.
    pub async fn bind(config: &ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.listen_addr()).await?;
        info!(address = %config.listen_addr(), "Server listening");

        Ok(Server {
            listener,
            stats: Arc::new(ServerStats::default()),
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        })
    }

    /// The address the listener actually bound to (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared counter handle, for observability.
    pub fn stats(&self) -> Arc<ServerStats> {
        Arc::clone(&self.stats)
    }

    /// Accept connections forever, dispatching each to its own task.
    ///
    /// The loop never waits on a handler; transient accept errors are
    /// logged and accepting continues.
    pub async fn run(&self) -> io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let stats = Arc::clone(&self.stats);
                    let client_num = stats.next_client();
                    debug!(client = client_num, peer = %addr, "New connection");

                    let read_timeout = self.read_timeout;
                    let write_timeout = self.write_timeout;
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, &stats, read_timeout, write_timeout).await
                        {
                            warn!(client = client_num, error = %e, "Connection error");
                        }
                        debug!(client = client_num, "Disconnected");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

/// Handle a single client connection: one request, one response.
///
/// The socket is dropped on every exit path. No response is written on read
/// failures; a decode failure gets an `ERROR:` line before closing.
async fn handle_connection(
    mut stream: TcpStream,
    stats: &ServerStats,
    read_timeout: Duration,
    write_timeout: Duration,
) -> Result<(), HandlerError> {
    let line = read_line(&mut stream, read_timeout).await?;

    let numbers = match protocol::decode_numbers(&line) {
        Ok(numbers) => numbers,
        Err(e) => {
            // Malformed request: report it to this one client and close.
            debug!(error = %e, "Decode failed");
            let response = format!("{}\n", protocol::encode_error(&e.to_string()));
            write_response(&mut stream, response.as_bytes(), write_timeout).await?;
            return Ok(());
        }
    };

    debug!(count = numbers.len(), "Received numbers");

    let mut sorted = numbers;
    sorted.sort_unstable();

    let response = format!("{}\n", protocol::encode_numbers(&sorted));
    write_response(&mut stream, response.as_bytes(), write_timeout).await?;

    stats.record_request();
    debug!(count = sorted.len(), "Sorted and sent numbers");

    Ok(())
}

/// Read one request line, up to and including the first `\n`.
///
/// Fails with `ReadTimeout` if the deadline elapses, or `Read` if the peer
/// closes before a newline arrives.
async fn read_line(stream: &mut TcpStream, deadline: Duration) -> Result<String, HandlerError> {
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

    loop {
        if let Some(pos) = find_newline(&buffer) {
            let line = String::from_utf8_lossy(&buffer[..pos]).into_owned();
            buffer.advance(pos + 1);
            return Ok(line);
        }

        let n = timeout(deadline, stream.read_buf(&mut buffer))
            .await
            .map_err(|_| HandlerError::ReadTimeout)?
            .map_err(HandlerError::Read)?;

        if n == 0 {
            // Peer closed before sending a complete line.
            return Err(HandlerError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before newline",
            )));
        }
    }
}

/// Write the full response under the write deadline.
async fn write_response(
    stream: &mut TcpStream,
    data: &[u8],
    deadline: Duration,
) -> Result<(), HandlerError> {
    timeout(deadline, stream.write_all(data))
        .await
        .map_err(|_| HandlerError::WriteTimeout)?
        .map_err(HandlerError::Write)
}

/// Find `\n` in the buffer, returning its position.
fn find_newline(buffer: &[u8]) -> Option<usize> {
    buffer.iter().position(|&b| b == b'\n')
}
