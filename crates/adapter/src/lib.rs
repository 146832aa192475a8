//! Adapter module - AI control via TCP socket with JSON protocol
//!
//! Lets an external agent process (a trainer, a scripted bot) play the
//! board through a TCP socket and watch it settle.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends the board after every settled cascade
//! 5. **Commanding**: Controller sends swaps; each is answered with `ack` or `error`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `swap: [[r, c], [r, c]]`, or `action: "pause" | "restart"`
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the board shape and assigned role
//! - **observation**: Board codes, phase, score, clock and the last cascade
//! - **ack**: The swap was accepted and its cascade started
//! - **error**: `code` + `message`; refused moves use `invalid_move`,
//!   `no_match` or `not_idle`
//!
//! # Environment Variables
//!
//! - `JEWELS_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `JEWELS_AI_PORT`: Port number (default: 7878)
//! - `JEWELS_AI_MAX_PENDING`: Command queue capacity (default: 10)
//! - `JEWELS_AI_DISABLED`: Set to "1" or "true" to disable adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1,"client":{"name":"my-ai","version":"1.0.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":2,"protocol_version":"1.0.0","client_id":1,"role":"controller","game_id":"tui-jewels","rows":8,"columns":8,"token_kinds":6}
//! Server -> Client: {"type":"observation","seq":1,"ts":3,"board":{...},"phase":"idle",...}
//! Client -> Server: {"type":"command","seq":2,"ts":4,"swap":[[3,4],[3,5]]}
//! Server -> Client: {"type":"ack","seq":2,"ts":5,"status":"ok"}
//! ```
//!
//! # Implementation
//!
//! - [`server`]: tokio TCP server, one task per client plus a writer task each
//! - [`runtime`]: [`Adapter`] owns the runtime and the channels to the game loop
//! - [`bridge`]: [`AdapterBridge`] applies commands to a session on the game loop
//! - [`protocol`]: message structures
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod bridge;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_jewels_core as core;
pub use tui_jewels_types as types;

pub use bridge::AdapterBridge;
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::*;
