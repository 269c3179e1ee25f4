//! Error types for the codec, the server handler, and the client driver.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Wire decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A non-empty token was not a valid base-10 integer.
    #[error("conversion error '{token}': invalid integer")]
    InvalidNumber { token: String },
}

/// Failures local to one server-side connection handler.
///
/// None of these are fatal to the process; the handler logs the error and
/// closes its connection.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("read deadline exceeded")]
    ReadTimeout,

    #[error("read error: {0}")]
    Read(#[source] io::Error),

    #[error("write deadline exceeded")]
    WriteTimeout,

    #[error("write error: {0}")]
    Write(#[source] io::Error),
}

/// Failures surfaced by the client driver. Never retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection timed out")]
    ConnectTimeout,

    #[error("connection error: {0}")]
    Connect(#[source] io::Error),

    #[error("send deadline exceeded")]
    WriteTimeout,

    #[error("send error: {0}")]
    Write(#[source] io::Error),

    #[error("read deadline exceeded")]
    ReadTimeout,

    #[error("read error: {0}")]
    Read(#[source] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The server explicitly reported a processing failure.
    #[error("server error: {message}")]
    Server { message: String },
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    FileRead(PathBuf, #[source] io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    TomlParse(PathBuf, #[source] toml::de::Error),
}
