//! Configuration for the server and client binaries.
//!
//! Supports both command-line arguments and a TOML configuration file for
//! the server. CLI arguments take precedence over config file values.

use crate::error::ConfigError;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default read deadline applied to the server's request read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default write deadline applied to the server's response write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Command-line interface for the numsort binary.
#[derive(Parser, Debug)]
#[command(name = "numsort")]
#[command(version = "0.1.0")]
#[command(about = "Sorts newline-delimited integer batches over TCP", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the sorting server
    Server(ServerArgs),
    /// Send a batch of random integers and report the sorted result
    Client(ClientArgs),
}

/// Server command-line arguments
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Client command-line arguments
#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Server address; a missing `:<port>` suffix defaults to :8080
    #[arg(short, long, default_value = "localhost:8080")]
    pub server: String,

    /// Timeout in seconds, shared by connect, send and read
    #[arg(short, long, default_value_t = 30)]
    pub timeout: u64,

    /// How many integers to generate
    #[arg(short, long, default_value_t = 10)]
    pub count: usize,

    /// Minimum generated value (inclusive)
    #[arg(long, default_value_t = 1)]
    pub min: i64,

    /// Maximum generated value (inclusive)
    #[arg(long, default_value_t = 1000)]
    pub max: i64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerSection {
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4040
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Deadline for reading the request line.
    pub read_timeout: Duration,
    /// Deadline for writing the response line.
    pub write_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Resolve configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load(args: &ServerArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = args.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(ServerConfig {
            host: args.host.clone().unwrap_or(toml_config.server.host),
            port: args.port.unwrap_or(toml_config.server.port),
            log_level: if args.log_level != "info" {
                args.log_level.clone()
            } else {
                toml_config.logging.level
            },
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        })
    }

    /// The `host:port` address to bind the listener to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Final resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: String,
    pub timeout: Duration,
    pub count: usize,
    pub min: i64,
    pub max: i64,
}

impl From<&ClientArgs> for ClientConfig {
    fn from(args: &ClientArgs) -> Self {
        Self {
            server: args.server.clone(),
            timeout: Duration::from_secs(args.timeout),
            count: args.count,
            min: args.min,
            max: args.max,
        }
    }
}
