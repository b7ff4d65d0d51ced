//! Networking for the oxo server: length-prefixed framing, the versioned
//! JSON wire protocol, per-connection session bookkeeping and the TCP server
//! itself. A small client for tests and tooling lives in [`client`].

pub mod client;
pub mod framing;
pub mod protocol;
pub mod registry;
pub mod server;

pub use client::{ClientError, GameClient};
pub use framing::{FrameConfig, FrameError, read_frame, write_frame};
pub use protocol::{ClientMessage, PROTOCOL_VERSION, ServerMessage, WireError, decode, encode};
pub use registry::SessionRegistry;
pub use server::{
    ConnectionId, ConnectionLimitReached, ConnectionMap, GameServer, IdGenerator, ServerConfig,
};
