//! Session opening and fallback against a loopback relay.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use phonehome_core::{
    Endpoint, Envelope, Error, MailTransport, SessionFailure, TransportConfig, open_session,
};
use phonehome_mime::MessageBuilder;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A permissive relay that accepts one connection and records commands.
async fn spawn_relay() -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut reader = BufReader::new(read_half);
        let mut commands = Vec::new();
        write_half.write_all(b"220 relay.local ESMTP\r\n").await.unwrap();

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await.unwrap() == 0 {
                break;
            }
            let line = line.trim_end().to_string();
            let upper = line.to_uppercase();
            commands.push(line);

            if upper == "DATA" {
                write_half.write_all(b"354 go ahead\r\n").await.unwrap();
                loop {
                    let mut data = String::new();
                    reader.read_line(&mut data).await.unwrap();
                    if data.trim_end() == "." {
                        break;
                    }
                }
                write_half.write_all(b"250 queued\r\n").await.unwrap();
            } else if upper == "QUIT" {
                write_half.write_all(b"221 bye\r\n").await.unwrap();
                break;
            } else if upper.starts_with("EHLO") {
                write_half.write_all(b"250-relay.local\r\n250 8BITMIME\r\n").await.unwrap();
            } else {
                write_half.write_all(b"250 ok\r\n").await.unwrap();
            }
        }
        commands
    });

    (port, handle)
}

async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_falls_back_to_internal_relay() {
    let (relay_port, relay) = spawn_relay().await;
    let dead_port = closed_port().await;

    let config: TransportConfig = serde_json::from_value(json!({
        "external": {
            "host": "127.0.0.1", "port": dead_port, "security": "none",
            "username": "me", "password": "secret", "sender": "me@example.com"
        },
        "internal": {
            "host": "127.0.0.1", "port": relay_port, "security": "none",
            "sender": "noreply@corp.example"
        },
        "client_hostname": "build-01"
    }))
    .unwrap();

    let mut session = open_session(&config).await.unwrap();
    assert_eq!(session.endpoint(), Endpoint::Internal);
    assert_eq!(session.sender(), "noreply@corp.example");

    let message = MessageBuilder::new()
        .from(session.sender())
        .to("fred@bedrock.com")
        .text_body("hello")
        .build()
        .unwrap();
    session
        .transmit(&Envelope {
            recipients: vec!["fred@bedrock.com".into()],
            message,
        })
        .await
        .unwrap();
    session.close().await;

    let commands = relay.await.unwrap();
    assert_eq!(commands[0], "EHLO build-01");
    assert!(commands.iter().all(|c| !c.starts_with("AUTH")));
    assert!(commands.contains(&"MAIL FROM:<noreply@corp.example>".to_string()));
    assert!(commands.contains(&"RCPT TO:<fred@bedrock.com>".to_string()));
    assert_eq!(commands.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn test_both_endpoints_down() {
    let dead_port = closed_port().await;
    let config: TransportConfig = serde_json::from_value(json!({
        "external": {"host": "127.0.0.1", "port": dead_port, "security": "none", "sender": "me@example.com"},
        "internal": {"host": "127.0.0.1", "port": dead_port, "security": "none", "sender": "me@example.com"}
    }))
    .unwrap();

    match open_session(&config).await.unwrap_err() {
        Error::SessionUnavailable(failures) => {
            assert_eq!(failures.len(), 2);
            assert!(matches!(failures[0], SessionFailure::ExternalSessionFailed(_)));
            assert!(matches!(failures[1], SessionFailure::InternalSessionFailed(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_no_internal_relay_configured() {
    let dead_port = closed_port().await;
    let config: TransportConfig = serde_json::from_value(json!({
        "external": {"host": "127.0.0.1", "port": dead_port, "security": "none", "sender": "me@example.com"}
    }))
    .unwrap();

    match open_session(&config).await.unwrap_err() {
        Error::SessionUnavailable(failures) => {
            assert_eq!(failures.len(), 2);
            assert!(matches!(failures[0], SessionFailure::ExternalSessionFailed(_)));
            assert_eq!(
                failures[1],
                SessionFailure::InternalSessionFailed("no internal relay configured".into())
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}
