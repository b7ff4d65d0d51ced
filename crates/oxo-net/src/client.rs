//! A minimal programmatic client for the framed JSON protocol.
//!
//! Intended for integration tests and tooling, not interactive play: one
//! request at a time, then await the pushed state. The server stays silent
//! for ignored requests, so callers expecting silence should wrap
//! [`GameClient::next_state`] in a timeout.

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use oxo_game::GameSnapshot;

use crate::framing::{self, FrameConfig, FrameError};
use crate::protocol::{self, ClientMessage, ServerMessage, WireError};

/// Errors surfaced to client callers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Establishing the TCP connection failed.
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    /// A frame could not be read or written.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A received payload could not be decoded.
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// A connected game client.
pub struct GameClient {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    frame: FrameConfig,
}

impl GameClient {
    /// Connect to a server with default framing limits.
    pub async fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(ClientError::Connect)?;
        stream.set_nodelay(true).map_err(ClientError::Connect)?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader,
            writer,
            frame: FrameConfig::default(),
        })
    }

    /// Request a fresh game. `None` selects the server's default policy.
    pub async fn start_game(&mut self, strategy: Option<&str>) -> Result<(), ClientError> {
        self.send(&ClientMessage::StartGame {
            strategy: strategy.map(str::to_owned),
        })
        .await
    }

    /// Claim a cell. Out-of-range indices are legal to send; the server
    /// ignores them.
    pub async fn make_move(&mut self, row: i32, col: i32) -> Result<(), ClientError> {
        self.send(&ClientMessage::MakeMove { row, col }).await
    }

    /// Await the next pushed state.
    pub async fn next_state(&mut self) -> Result<GameSnapshot, ClientError> {
        let payload = framing::read_frame(&mut self.reader, &self.frame).await?;
        let ServerMessage::GameState(snapshot) = protocol::decode(&payload)?;
        Ok(snapshot)
    }

    /// Send an arbitrary pre-encoded payload as one frame, bypassing the
    /// protocol layer. An escape hatch for protocol tests.
    pub async fn send_raw(&mut self, payload: &[u8]) -> Result<(), ClientError> {
        framing::write_frame(&mut self.writer, payload, &self.frame).await?;
        Ok(())
    }

    async fn send(&mut self, request: &ClientMessage) -> Result<(), ClientError> {
        let payload = protocol::encode(request).map_err(WireError::from)?;
        framing::write_frame(&mut self.writer, &payload, &self.frame).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
