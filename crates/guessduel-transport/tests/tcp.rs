//! Integration tests for the TCP transport.
//!
//! These spin up a real listener on a random loopback port and talk to
//! it with a plain `TcpStream`, so partial writes and coalesced frames
//! really go through the kernel.

use std::time::Duration;

use guessduel_transport::{Connection, TcpConnection, TcpTransport, Transport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Binds a transport, connects one client, and returns both ends.
async fn connected_pair() -> (TcpConnection, TcpStream) {
    let mut transport = TcpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("should have local addr");

    let server = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let client = TcpStream::connect(addr).await.expect("client should connect");
    let conn = server.await.expect("accept task should complete");
    (conn, client)
}

#[tokio::test]
async fn test_send_appends_delimiter() {
    let (conn, mut client) = connected_pair().await;
    assert!(conn.id().into_inner() > 0);

    conn.send(b"hello from server").await.expect("send should succeed");

    let mut buf = vec![0u8; 18];
    client.read_exact(&mut buf).await.expect("client should read");
    assert_eq!(&buf, b"hello from server\n");
}

#[tokio::test]
async fn test_recv_splits_coalesced_frames() {
    let (conn, mut client) = connected_pair().await;

    client.write_all(b"first\nsecond\n").await.unwrap();

    assert_eq!(conn.recv().await.unwrap(), Some(b"first".to_vec()));
    assert_eq!(conn.recv().await.unwrap(), Some(b"second".to_vec()));
}

#[tokio::test]
async fn test_recv_joins_partial_writes() {
    let (conn, mut client) = connected_pair().await;

    let reader = tokio::spawn(async move {
        let frame = conn.recv().await.unwrap();
        (conn, frame)
    });

    client.write_all(b"{\"type\":").await.unwrap();
    client.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    client.write_all(b"\"leave\"}\n").await.unwrap();

    let (_conn, frame) = reader.await.unwrap();
    assert_eq!(frame, Some(b"{\"type\":\"leave\"}".to_vec()));
}

#[tokio::test]
async fn test_recv_returns_none_on_peer_shutdown() {
    let (conn, client) = connected_pair().await;
    drop(client);

    let result = conn.recv().await.expect("clean close is not an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_close_is_seen_by_client() {
    let (conn, mut client) = connected_pair().await;

    conn.close().await.expect("close should succeed");

    let mut buf = [0u8; 8];
    let n = client.read(&mut buf).await.unwrap();
    assert_eq!(n, 0, "client should observe EOF");
}

#[tokio::test]
async fn test_send_rejects_embedded_newline() {
    let (conn, _client) = connected_pair().await;
    assert!(conn.send(b"bad\npayload").await.is_err());
}
