use std::net::TcpListener;

use tokio::sync::mpsc;

use tui_jewels::adapter::server::{run_server, ServerConfig};
use tui_jewels::adapter::{Adapter, InboundCommand, OutboundMessage};

#[test]
fn adapter_server_fails_when_port_in_use() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral port");
    let port = listener.local_addr().unwrap().port();

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..ServerConfig::default()
    };
    let (cmd_tx, _cmd_rx) = mpsc::channel::<InboundCommand>(1);
    let (_out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

    let err = tokio_test::block_on(run_server(config, cmd_tx, out_rx, None))
        .expect_err("expected bind failure");
    assert!(err.to_string().contains("failed to bind"), "got {err:#}");
}

#[test]
fn adapter_start_rejects_bad_host() {
    let config = ServerConfig {
        host: "not an address".to_string(),
        ..ServerConfig::default()
    };
    assert!(Adapter::start(config).is_err());
}
