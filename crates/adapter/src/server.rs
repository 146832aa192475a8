//! TCP server for AI adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::{GameConfig, GameSnapshot};
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Board shape announced in `welcome`
    pub rows: u8,
    pub columns: u8,
    pub token_kinds: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let game = GameConfig::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            rows: game.rows,
            columns: game.columns,
            token_kinds: game.token_kinds,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("JEWELS_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("JEWELS_AI_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("JEWELS_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
            ..defaults
        }
    }

    /// Announce the shape of the board this server fronts
    pub fn with_game(mut self, game: &GameConfig) -> Self {
        self.rows = game.rows;
        self.columns = game.columns;
        self.token_kinds = game.token_kinds;
        self
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: Arc<RwLock<Vec<ClientHandle>>>,
    controller: Arc<RwLock<Option<usize>>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: Arc::new(RwLock::new(Vec::new())),
            controller: Arc::new(RwLock::new(None)),
        }
    }

    /// Check if AI is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("JEWELS_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub is_controller: bool,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
    Observation(ObservationMessage),
}

async fn is_handshaken(state: &Arc<ServerState>, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

async fn is_controller(state: &Arc<ServerState>, client_id: usize) -> bool {
    *state.controller.read().await == Some(client_id)
}

/// Record `seq` for this client; false if it does not strictly increase.
async fn check_and_update_seq(state: &Arc<ServerState>, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

async fn send_to(state: &Arc<ServerState>, client_id: usize, msg: ClientOutbound) {
    let clients = state.clients.read().await;
    if let Some(c) = clients.iter().find(|c| c.id == client_id) {
        let _ = c.tx.send(msg);
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    if ServerState::is_disabled() {
        println!("[Adapter] AI control disabled via JEWELS_AI_DISABLED");
        return Ok(());
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    println!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        send_to(&state, client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        send_to(&state, client_id, ClientOutbound::Error(err)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        send_to(&state, client_id, ClientOutbound::Observation(*obs)).await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter() {
                            if c.handshaken && c.stream_observations {
                                let _ = c.tx.send(ClientOutbound::Observation((*obs).clone()));
                            }
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Adapter] Client {} connected from {}", client_id, addr);

        let state_clone = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state_clone, command_tx).await {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            println!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Serialize one message as a JSON line into `buf`.
fn encode_line<T: Serialize>(buf: &mut Vec<u8>, msg: &T) -> bool {
    buf.clear();
    if serde_json::to_writer(&mut *buf, msg).is_err() {
        return false;
    }
    buf.push(b'\n');
    true
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            is_controller: false,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    // Spawn task to write messages to client
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            let encoded = match &msg {
                ClientOutbound::Ack(v) => encode_line(&mut buf, v),
                ClientOutbound::Error(v) => encode_line(&mut buf, v),
                ClientOutbound::Welcome(v) => encode_line(&mut buf, v),
                ClientOutbound::Observation(v) => encode_line(&mut buf, v),
            };
            if !encoded {
                continue;
            }
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    // Handle incoming messages
    let mut line = String::new();
    loop {
        line.clear();
        // A read error (e.g. invalid UTF-8) still has to run the cleanup below.
        let bytes_read = match reader.read_line(&mut line).await {
            Ok(n) => n,
            Err(e) => {
                eprintln!("[Adapter] Client {} read error: {}", client_id, e);
                break;
            }
        };
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, hello.seq).await
                {
                    reply(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if !is_compatible_version(&hello.protocol_version) {
                    reply(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                // First client to hello becomes controller
                let role = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    let became_controller = controller.is_none();
                    if became_controller {
                        *controller = Some(client_id);
                    }
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                        if became_controller {
                            client.is_controller = true;
                        }
                    }
                    if became_controller {
                        println!(
                            "[Adapter] Client {} ({}) is now controller",
                            client_id, hello.client.name
                        );
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    }
                };

                let welcome = create_welcome(
                    hello.seq,
                    client_id as u64,
                    role,
                    state.config.rows,
                    state.config.columns,
                    state.config.token_kinds,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                // Initial snapshot for streaming clients.
                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !is_handshaken(&state, client_id).await {
                    reply(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !check_and_update_seq(&state, client_id, cmd.seq).await {
                    reply(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !is_controller(&state, client_id).await {
                    reply(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        reply(cmd.seq, ErrorCode::InvalidCommand, message);
                        continue;
                    }
                };

                // Backpressure: bounded queue. The game loop acks once applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    reply(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !is_handshaken(&state, client_id).await {
                    reply(ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                    continue;
                }
                if !check_and_update_seq(&state, client_id, ctrl.seq).await {
                    reply(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let mut controller = state.controller.write().await;
                let mut clients = state.clients.write().await;
                match ctrl.action {
                    ControlAction::Claim => {
                        if controller.is_none() || *controller == Some(client_id) {
                            *controller = Some(client_id);
                            if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                                client.is_controller = true;
                            }
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        } else {
                            reply(ctrl.seq, ErrorCode::ControllerActive, "Controller already assigned");
                        }
                    }
                    ControlAction::Release => {
                        if *controller == Some(client_id) {
                            *controller = None;
                            if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                                client.is_controller = false;
                            }
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        } else {
                            reply(ctrl.seq, ErrorCode::NotController, "Only controller may release");
                        }
                    }
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, unknown.seq).await
                {
                    reply(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                reply(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    // Clean up: remove client and release/promote controller if needed.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;

        let was_controller = *controller == Some(client_id);
        clients.retain(|c| c.id != client_id);

        if was_controller {
            // Promote the next handshaken client (lowest id) to controller.
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            if let Some(new_id) = next_id {
                if let Some(c) = clients.iter_mut().find(|c| c.id == new_id) {
                    c.is_controller = true;
                }
                println!("[Adapter] Controller {} promoted", new_id);
            } else {
                println!("[Adapter] Controller {} released", client_id);
            }
        }
    }

    drop(tx);
    let _ = write_task.await;

    Ok(())
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, &'static str> {
    match (cmd.swap, cmd.action) {
        (Some([a, b]), None) => Ok(ClientCommand::Swap {
            a: coord_from_wire(a),
            b: coord_from_wire(b),
        }),
        (None, Some(action)) => Ok(ClientCommand::Action(action.into())),
        (Some(_), Some(_)) => Err("Send either swap or action, not both"),
        (None, None) => Err("Missing swap"),
    }
}

/// Build an observation message from a session snapshot
pub fn build_observation(snapshot: &GameSnapshot, seq: u64) -> ObservationMessage {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    snapshot.rows.hash(&mut hasher);
    snapshot.columns.hash(&mut hasher);
    snapshot.codes.hash(&mut hasher);
    snapshot.special.hash(&mut hasher);
    (snapshot.phase as u8).hash(&mut hasher);
    snapshot.score.hash(&mut hasher);
    snapshot.pending_score_delta.hash(&mut hasher);
    snapshot.chain.hash(&mut hasher);
    snapshot.moves.hash(&mut hasher);
    snapshot.paused.hash(&mut hasher);
    snapshot.round_over.hash(&mut hasher);
    snapshot.episode_id.hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snapshot.playable(),
        paused: snapshot.paused,
        round_over: snapshot.round_over,
        episode_id: snapshot.episode_id,
        board: BoardSnapshot::from_snapshot(snapshot),
        phase: PhaseLower::from(snapshot.phase),
        score: snapshot.score,
        pending_score_delta: snapshot.pending_score_delta,
        chain: snapshot.chain,
        best_chain: snapshot.best_chain,
        moves: snapshot.moves,
        remaining_ms: snapshot.timed.then_some(snapshot.remaining_ms),
        last_cascade: snapshot.last_cascade.map(LastCascade::from),
        state_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameState;
    use crate::types::{Coord, GameAction};

    fn command(json: &str) -> CommandMessage {
        match parse_message(json).unwrap() {
            ParsedMessage::Command(c) => c,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_map_swap_command() {
        let cmd = command(r#"{"type":"command","seq":1,"ts":0,"swap":[[0,0],[0,1]]}"#);
        match map_command(&cmd).unwrap() {
            ClientCommand::Swap { a, b } => {
                assert_eq!(a, Coord::new(0, 0));
                assert_eq!(b, Coord::new(0, 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_map_action_and_missing() {
        let cmd = command(r#"{"type":"command","seq":1,"ts":0,"action":"pause"}"#);
        assert!(matches!(
            map_command(&cmd),
            Ok(ClientCommand::Action(GameAction::Pause))
        ));

        let cmd = command(r#"{"type":"command","seq":2,"ts":0}"#);
        assert!(map_command(&cmd).is_err());

        let cmd =
            command(r#"{"type":"command","seq":3,"ts":0,"swap":[[0,0],[0,1]],"action":"pause"}"#);
        assert!(map_command(&cmd).is_err());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.rows, 8);
        assert_eq!(config.socket_addr().unwrap().port(), 7878);

        let bad = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_with_game_announces_board_shape() {
        let game = GameConfig::default().with_size(6, 9).with_token_kinds(7);
        let config = ServerConfig::default().with_game(&game);
        assert_eq!((config.rows, config.columns, config.token_kinds), (6, 9, 7));
    }

    #[test]
    fn test_observation_board_layout() {
        let gs = GameState::new(GameConfig::default().with_seed(3)).unwrap();
        let snap = gs.snapshot();
        let obs = build_observation(&snap, 1);
        assert_eq!(obs.board.cells.len(), 8);
        assert!(obs.board.cells.iter().all(|r| r.len() == 8));
        let c = Coord::new(2, 5);
        assert_eq!(obs.board.cells[2][5], gs.board().get(c).unwrap().code());
        assert_eq!(obs.phase, PhaseLower::Idle);
        assert_eq!(obs.remaining_ms, Some(60_000));
        assert!(obs.playable);
    }

    #[test]
    fn test_state_hash_changes_with_state() {
        let mut gs = GameState::new(GameConfig::default().with_seed(3)).unwrap();
        let a = build_observation(&gs.snapshot(), 1);
        let b = build_observation(&gs.snapshot(), 2);
        assert_eq!(a.state_hash, b.state_hash);

        assert!(gs.apply_action(GameAction::Pause));
        let c = build_observation(&gs.snapshot(), 3);
        assert_ne!(a.state_hash, c.state_hash);
    }
}
