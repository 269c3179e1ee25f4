//! Client driver: generates a random integer batch, sends it to the server
//! and verifies the sorted response.
//!
//! A single configured timeout bounds the connect, the send and the read.
//! The round-trip latency is measured from just before the send to just
//! after the response read completes.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::protocol;
use bytes::{Buf, BytesMut};
use rand::Rng;
use std::io;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// Port appended when the configured address carries none.
const DEFAULT_PORT: u16 = 8080;

/// Outcome of one request/response exchange.
#[derive(Debug)]
pub struct SortReport {
    /// The batch that was sent, in generation order.
    pub sent: Vec<i64>,
    /// The batch the server returned.
    pub received: Vec<i64>,
    /// Whether the returned batch is non-decreasing (self-check only).
    pub sorted: bool,
    /// Round-trip latency of the exchange.
    pub elapsed: Duration,
}

/// One-shot client session.
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Client { config }
    }

    /// Run one exchange: connect, send a generated batch, read and verify
    /// the sorted response.
    pub async fn run(&self) -> Result<SortReport, ClientError> {
        let addr = normalize_addr(&self.config.server);
        info!(address = %addr, "Connecting");

        let mut stream = timeout(self.config.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ClientError::ConnectTimeout)?
            .map_err(ClientError::Connect)?;

        let numbers = self.generate_numbers();
        info!(
            count = numbers.len(),
            min = self.config.min,
            max = self.config.max,
            "Generated numbers"
        );
        debug!(?numbers, "Request batch");

        let request = format!("{}\n", protocol::encode_numbers(&numbers));

        let start = Instant::now();

        timeout(self.config.timeout, stream.write_all(request.as_bytes()))
            .await
            .map_err(|_| ClientError::WriteTimeout)?
            .map_err(ClientError::Write)?;

        let line = read_line(&mut stream, self.config.timeout).await?;

        let elapsed = start.elapsed();

        let line = line.trim();
        if protocol::is_error_response(line) {
            let message = line
                .strip_prefix(protocol::ERROR_PREFIX)
                .unwrap_or(line)
                .trim()
                .to_string();
            return Err(ClientError::Server { message });
        }

        let received = protocol::decode_numbers(line)?;
        let sorted = is_sorted(&received);

        info!(count = received.len(), sorted, ?elapsed, "Received response");

        Ok(SortReport {
            sent: numbers,
            received,
            sorted,
            elapsed,
        })
    }

    /// Generate `count` integers uniformly in `[min, max]` inclusive.
    fn generate_numbers(&self) -> Vec<i64> {
        let mut rng = rand::thread_rng();
        (0..self.config.count)
            .map(|_| rng.gen_range(self.config.min..=self.config.max))
            .collect()
    }
}

/// Append the default port when the address has no `:<port>` suffix.
fn normalize_addr(addr: &str) -> String {
    if ends_with_port(addr) {
        addr.to_string()
    } else {
        format!("{}:{}", addr, DEFAULT_PORT)
    }
}

/// Whether the address ends in a `:<1-5 digit>` port suffix.
fn ends_with_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((_, suffix)) => {
            !suffix.is_empty() && suffix.len() <= 5 && suffix.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Read one response line, up to and including the first `\n`.
async fn read_line(stream: &mut TcpStream, deadline: Duration) -> Result<String, ClientError> {
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        if let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line = String::from_utf8_lossy(&buffer[..pos]).into_owned();
            buffer.advance(pos + 1);
            return Ok(line);
        }

        let n = timeout(deadline, stream.read_buf(&mut buffer))
            .await
            .map_err(|_| ClientError::ReadTimeout)?
            .map_err(ClientError::Read)?;

        if n == 0 {
            return Err(ClientError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before newline",
            )));
        }
    }
}

/// Non-decreasing check over the returned batch.
fn is_sorted(numbers: &[i64]) -> bool {
    numbers.windows(2).all(|pair| pair[0] <= pair[1])
}
