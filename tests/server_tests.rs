//! End-to-end tests driving a live listener over real TCP sockets.

use numsort::client::Client;
use numsort::config::{ClientConfig, ServerConfig};
use numsort::error::ClientError;
use numsort::server::{Server, ServerStats};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Spawn a server on an ephemeral port and return its address and counters.
async fn spawn_server(read_timeout: Duration) -> (SocketAddr, Arc<ServerStats>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        read_timeout,
        ..ServerConfig::default()
    };

    let server = Server::bind(&config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let stats = server.stats();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    (addr, stats)
}

/// Send one raw request line and read everything until the server closes.
async fn exchange(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_sorts_batch() {
    let (addr, _) = spawn_server(Duration::from_secs(30)).await;
    let response = exchange(addr, "5,3,8,1,9,2,7\n").await;
    assert_eq!(response, "1,2,3,5,7,8,9\n");
}

#[tokio::test]
async fn test_sorts_negatives_and_duplicates() {
    let (addr, _) = spawn_server(Duration::from_secs(30)).await;
    let response = exchange(addr, "3,-1,3,0,-1\n").await;
    assert_eq!(response, "-1,-1,0,3,3\n");
}

#[tokio::test]
async fn test_empty_line_is_valid() {
    let (addr, _) = spawn_server(Duration::from_secs(30)).await;
    let response = exchange(addr, "\n").await;
    assert_eq!(response, "\n");
}

#[tokio::test]
async fn test_empty_tokens_are_skipped() {
    let (addr, _) = spawn_server(Duration::from_secs(30)).await;
    let response = exchange(addr, ",9, ,1,\n").await;
    assert_eq!(response, "1,9\n");
}

#[tokio::test]
async fn test_malformed_token_yields_error_response() {
    let (addr, stats) = spawn_server(Duration::from_secs(30)).await;
    let response = exchange(addr, "3,x,5\n").await;

    assert!(response.starts_with("ERROR:"), "got: {response}");
    assert!(response.contains('x'), "error should name the token: {response}");
    assert!(response.ends_with('\n'));

    // A rejected request is never counted as processed.
    assert_eq!(stats.requests_processed(), 0);
}

#[tokio::test]
async fn test_silent_peer_is_closed_without_response() {
    let (addr, stats) = spawn_server(Duration::from_millis(100)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();

    // Send nothing; the server must close after its read deadline.
    let mut buf = Vec::new();
    let n = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("server should close the connection")
        .unwrap();

    assert_eq!(n, 0, "no response may be written on a read timeout");
    assert_eq!(stats.requests_processed(), 0);
    assert_eq!(stats.clients_accepted(), 1);
}

#[tokio::test]
async fn test_incomplete_line_then_disconnect() {
    let (addr, stats) = spawn_server(Duration::from_secs(30)).await;

    {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"1,2,3").await.unwrap();
        // Drop without ever sending the newline.
    }

    // The handler unwinds without crashing the loop; a later client
    // is still served.
    let response = exchange(addr, "2,1\n").await;
    assert_eq!(response, "1,2\n");
    assert_eq!(stats.requests_processed(), 1);
}

#[tokio::test]
async fn test_concurrent_clients_no_cross_talk() {
    let (addr, stats) = spawn_server(Duration::from_secs(30)).await;

    let mut tasks = Vec::new();
    for i in 0..8i64 {
        tasks.push(tokio::spawn(async move {
            let base = i * 100;
            let request = format!("{},{},{}\n", base + 3, base + 1, base + 2);
            let expected = format!("{},{},{}\n", base + 1, base + 2, base + 3);
            let response = exchange(addr, &request).await;
            assert_eq!(response, expected);
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(stats.clients_accepted(), 8);
    assert_eq!(stats.requests_processed(), 8);
}

#[tokio::test]
async fn test_client_end_to_end() {
    let (addr, _) = spawn_server(Duration::from_secs(30)).await;

    let client = Client::new(ClientConfig {
        server: addr.to_string(),
        timeout: Duration::from_secs(5),
        count: 5,
        min: 1,
        max: 10,
    });

    let report = client.run().await.unwrap();
    assert_eq!(report.sent.len(), 5);
    assert_eq!(report.received.len(), 5);
    assert!(report.sorted);
    assert!(report.received.iter().all(|&n| (1..=10).contains(&n)));

    let mut expected = report.sent.clone();
    expected.sort_unstable();
    assert_eq!(report.received, expected);
    assert!(report.elapsed > Duration::ZERO);
}

#[tokio::test]
async fn test_client_connect_failure() {
    // Nothing listens on this address; connect must fail, not hang.
    let client = Client::new(ClientConfig {
        server: "127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(2),
        count: 1,
        min: 1,
        max: 1,
    });

    match client.run().await {
        Err(ClientError::Connect(_)) | Err(ClientError::ConnectTimeout) => {}
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_client_surfaces_server_error() {
    let (addr, _) = spawn_server(Duration::from_secs(30)).await;

    // Speak the protocol by hand to force a decode failure server-side,
    // then check the client-visible classification.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"1,bogus\n").await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(numsort::protocol::is_error_response(&response));
    assert!(response.contains("bogus"));
}
