use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use tui_jewels::adapter::protocol::{create_ack, create_hello, create_swap};
use tui_jewels::adapter::server::{run_server, ServerConfig};
use tui_jewels::adapter::{InboundCommand, InboundPayload, OutboundMessage};
use tui_jewels::types::Coord;

async fn read_line(
    lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
) -> String {
    tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timeout waiting for line")
        .expect("io error")
        .expect("expected line")
}

#[tokio::test]
async fn controller_disconnect_does_not_leave_stale_controller() {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: 64,
        ..ServerConfig::default()
    };

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(128);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });

    // Minimal game loop: ack every command so the client can observe controller gating.
    let engine_handle = tokio::spawn(async move {
        while let Some(inbound) = cmd_rx.recv().await {
            if matches!(inbound.payload, InboundPayload::Command(_)) {
                let _ = out_tx.send(OutboundMessage::ToClientAck {
                    client_id: inbound.client_id,
                    ack: create_ack(inbound.seq),
                });
            }
        }
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();

    // Client 2 connects first as an observer and waits.
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut observer_w) = stream.into_split();
    let mut observer_lines = BufReader::new(read_half).lines();

    // Client 1 becomes controller on hello and then disconnects with a read error.
    {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        let mut hello = create_hello(1, "ctrl1", "1.0.0");
        hello.requested.stream_observations = false;
        write_half
            .write_all(serde_json::to_string(&hello).unwrap().as_bytes())
            .await
            .unwrap();
        write_half.write_all(b"\n").await.unwrap();
        write_half.flush().await.unwrap();

        let welcome: serde_json::Value = serde_json::from_str(&read_line(&mut lines).await).unwrap();
        assert_eq!(welcome["type"], "welcome");
        assert_eq!(welcome["role"], "controller");

        let mut hello = create_hello(1, "observer", "1.0.0");
        hello.requested.stream_observations = false;
        observer_w
            .write_all(serde_json::to_string(&hello).unwrap().as_bytes())
            .await
            .unwrap();
        observer_w.write_all(b"\n").await.unwrap();
        observer_w.flush().await.unwrap();
        let welcome: serde_json::Value =
            serde_json::from_str(&read_line(&mut observer_lines).await).unwrap();
        assert_eq!(welcome["role"], "observer");

        // Invalid UTF-8 forces a read error in the server's line reader. The
        // cleanup path has to run for I/O errors as well as for a clean EOF.
        write_half.write_all(&[0xFF, b'\n']).await.unwrap();
        let _ = write_half.flush().await;
    }

    // Give the server a moment to observe the disconnect and run cleanup.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The waiting observer has been promoted and may now send moves.
    let cmd = create_swap(2, Coord::new(0, 0), Coord::new(0, 1));
    observer_w
        .write_all(serde_json::to_string(&cmd).unwrap().as_bytes())
        .await
        .unwrap();
    observer_w.write_all(b"\n").await.unwrap();
    observer_w.flush().await.unwrap();

    let resp: serde_json::Value = serde_json::from_str(&read_line(&mut observer_lines).await).unwrap();
    assert_eq!(resp["type"], "ack", "expected ack, got {resp}");
    assert_eq!(resp["seq"], 2);

    // A newcomer is only an observer now.
    {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        let mut hello = create_hello(1, "late", "1.0.0");
        hello.requested.stream_observations = false;
        write_half
            .write_all(serde_json::to_string(&hello).unwrap().as_bytes())
            .await
            .unwrap();
        write_half.write_all(b"\n").await.unwrap();
        write_half.flush().await.unwrap();

        let welcome: serde_json::Value = serde_json::from_str(&read_line(&mut lines).await).unwrap();
        assert_eq!(welcome["role"], "observer");
    }

    server_handle.abort();
    engine_handle.abort();
}
