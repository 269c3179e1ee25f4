//! numsort: sorts newline-delimited integer batches over TCP.
//!
//! Two subcommands:
//! - `server`: accept connections, sort each client's batch, reply
//! - `client`: generate a random batch, send it, verify the sorted reply

use clap::Parser;
use numsort::client::Client;
use numsort::config::{Cli, ClientConfig, Command, ServerConfig};
use numsort::server::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Server(args) => {
            let config = ServerConfig::load(&args)?;
            init_logging(&config.log_level);
            run_server(config)
        }
        Command::Client(args) => {
            init_logging(&args.log_level);
            run_client(ClientConfig::from(&args))
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        host = %config.host,
        port = config.port,
        "Starting numsort server"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        // Bind failure is the only fatal error; accept errors are
        // handled inside the loop.
        let server = Server::bind(&config).await?;
        server.run().await
    })?;

    Ok(())
}

fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let client = Client::new(config);
        let start = std::time::Instant::now();

        match client.run().await {
            Ok(report) => {
                println!("numbers are sorted: {}", report.sorted);
                println!("response: {:?}", report.received);
                println!("elapsed time = {:?}", report.elapsed);
            }
            Err(e) => {
                // Failures are reported, never retried; elapsed time is
                // still printed.
                error!(error = %e, "Request failed");
                println!("error: {}", e);
                println!("elapsed time = {:?}", start.elapsed());
            }
        }
    });

    Ok(())
}
