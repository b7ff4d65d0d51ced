//! The TCP game server: accept loop, connection lifecycle and request
//! dispatch.
//!
//! Each accepted connection gets its own task that reads framed requests,
//! applies them through the [`SessionRegistry`] and pushes the resulting
//! state back over the same connection. Requests from one connection are
//! handled strictly in arrival order; a disconnect discards that
//! connection's session immediately.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, RwLock, watch};

use oxo_game::{Coord, GameSnapshot, Strategy};

use crate::framing::{self, FrameConfig, FrameError};
use crate::protocol::{self, ClientMessage, ServerMessage};
use crate::registry::SessionRegistry;

// ---------------------------------------------------------------------------
// Connection identity
// ---------------------------------------------------------------------------

/// Unique identifier for a client connection within a server's lifetime.
///
/// Also the key under which the connection's session lives; ids are never
/// reused, so a reconnecting client starts from a clean slate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

/// Atomic generator for monotonically increasing [`ConnectionId`]s.
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// A generator starting at 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// The next unused [`ConnectionId`].
    pub fn next_id(&self) -> ConnectionId {
        ConnectionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Connection map
// ---------------------------------------------------------------------------

/// Error returned when the connection map is at capacity.
#[derive(Debug)]
pub struct ConnectionLimitReached;

/// Active connections and their write halves, keyed by [`ConnectionId`].
///
/// Each write half sits behind its own lock, so a push to one client never
/// waits on traffic to another.
pub struct ConnectionMap {
    inner: RwLock<HashMap<ConnectionId, Arc<Mutex<OwnedWriteHalf>>>>,
    max_connections: usize,
}

impl ConnectionMap {
    /// An empty map with the given capacity limit.
    pub fn new(max_connections: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            max_connections,
        }
    }

    /// Register a connection. Fails when the map is at capacity.
    pub async fn insert(
        &self,
        id: ConnectionId,
        writer: OwnedWriteHalf,
    ) -> Result<(), ConnectionLimitReached> {
        let mut map = self.inner.write().await;
        if map.len() >= self.max_connections {
            return Err(ConnectionLimitReached);
        }
        map.insert(id, Arc::new(Mutex::new(writer)));
        Ok(())
    }

    /// Deregister a connection. Returns whether it was present.
    pub async fn remove(&self, id: &ConnectionId) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    /// Frame and write `payload` to connection `id`.
    ///
    /// Returns `Ok(false)` when the connection is no longer registered;
    /// that is not an error because disconnects race with pushes.
    pub async fn send(
        &self,
        id: ConnectionId,
        payload: &[u8],
        config: &FrameConfig,
    ) -> Result<bool, FrameError> {
        let writer = {
            let map = self.inner.read().await;
            match map.get(&id) {
                Some(writer) => Arc::clone(writer),
                None => return Ok(false),
            }
        };
        let mut writer = writer.lock().await;
        framing::write_frame(&mut *writer, payload, config).await?;
        Ok(true)
    }

    /// Number of active connections.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether no connection is active.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Configuration for [`GameServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind. Default: `0.0.0.0:8000`.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections. Default: 256.
    pub max_connections: usize,
    /// Framing limits applied to client traffic.
    pub frame: FrameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().unwrap(),
            max_connections: 256,
            frame: FrameConfig::default(),
        }
    }
}

/// TCP server hosting one game session per connection.
pub struct GameServer {
    config: ServerConfig,
    /// Active connection map (public for test inspection).
    pub connections: Arc<ConnectionMap>,
    /// Live sessions (public for test inspection).
    pub registry: Arc<SessionRegistry>,
    id_gen: Arc<IdGenerator>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GameServer {
    /// A server owning a fresh registry.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry(config, Arc::new(SessionRegistry::new()))
    }

    /// A server over an existing registry.
    pub fn with_registry(config: ServerConfig, registry: Arc<SessionRegistry>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            connections: Arc::new(ConnectionMap::new(config.max_connections)),
            registry,
            id_gen: Arc::new(IdGenerator::new()),
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("game server listening on {}", self.config.bind_addr);
        self.run_with_listener(listener).await
    }

    /// Serve from a pre-bound listener (lets tests use ephemeral ports).
    pub async fn run_with_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        let mut shutdown_rx = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, peer_addr) = result?;
                    stream.set_nodelay(true)?;

                    let id = self.id_gen.next_id();
                    let (reader, writer) = stream.into_split();

                    if self.connections.insert(id, writer).await.is_err() {
                        tracing::warn!("connection limit reached, rejecting {peer_addr}");
                        continue;
                    }
                    tracing::info!("accepted connection {id:?} from {peer_addr}");

                    let connections = Arc::clone(&self.connections);
                    let registry = Arc::clone(&self.registry);
                    let frame = self.config.frame.clone();
                    let mut task_shutdown = self.shutdown_rx.clone();

                    tokio::spawn(async move {
                        Self::handle_connection(
                            id,
                            reader,
                            &connections,
                            &registry,
                            &frame,
                            &mut task_shutdown,
                        )
                        .await;
                        connections.remove(&id).await;
                        registry.end(id);
                        tracing::info!("connection {id:?} closed");
                    });
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("game server shutting down");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Signal a graceful shutdown to the accept loop and every handler.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Per-connection loop: read frames, dispatch requests, push state.
    async fn handle_connection(
        id: ConnectionId,
        mut reader: OwnedReadHalf,
        connections: &ConnectionMap,
        registry: &SessionRegistry,
        frame: &FrameConfig,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                result = framing::read_frame(&mut reader, frame) => {
                    match result {
                        Ok(payload) => {
                            if !Self::handle_frame(id, &payload, connections, registry, frame).await {
                                break;
                            }
                        }
                        Err(FrameError::ConnectionClosed) => break,
                        Err(FrameError::PayloadTooLarge { size, max }) => {
                            // The stream is desynchronized past a bogus
                            // prefix; nothing to do but hang up.
                            tracing::warn!(
                                "connection {id:?} announced a {size} byte frame (limit {max})"
                            );
                            break;
                        }
                        Err(FrameError::Io(e)) => {
                            tracing::warn!("connection {id:?} read failed: {e}");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }

    /// Decode and dispatch one frame. Returns `false` when the connection
    /// should be dropped because a push could not be delivered.
    async fn handle_frame(
        id: ConnectionId,
        payload: &[u8],
        connections: &ConnectionMap,
        registry: &SessionRegistry,
        frame: &FrameConfig,
    ) -> bool {
        let request = match protocol::decode::<ClientMessage>(payload) {
            Ok(request) => request,
            Err(e) => {
                // Unintelligible frames are dropped; the connection lives on.
                tracing::warn!("connection {id:?} sent an undecodable frame: {e}");
                return true;
            }
        };

        let snapshot = match request {
            ClientMessage::StartGame { strategy } => {
                let strategy = Strategy::from_name(strategy.as_deref().unwrap_or(""));
                tracing::info!("connection {id:?} starts a {} game", strategy.name());
                Some(registry.start_game(id, strategy))
            }
            ClientMessage::MakeMove { row, col } => match Coord::from_signed(row, col) {
                Some(at) => {
                    let pushed = registry.apply_move(id, at);
                    if pushed.is_none() {
                        tracing::debug!("connection {id:?} move at {at} ignored");
                    }
                    pushed
                }
                None => {
                    tracing::debug!("connection {id:?} move at ({row}, {col}) out of bounds");
                    None
                }
            },
        };

        match snapshot {
            // Ignored requests push nothing.
            None => true,
            Some(snapshot) => Self::push_state(id, snapshot, connections, frame).await,
        }
    }

    /// Push a state snapshot to `id`. Returns `false` if delivery failed.
    async fn push_state(
        id: ConnectionId,
        snapshot: GameSnapshot,
        connections: &ConnectionMap,
        frame: &FrameConfig,
    ) -> bool {
        let payload = match protocol::encode(&ServerMessage::GameState(snapshot)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("failed to encode state for {id:?}: {e}");
                return true;
            }
        };
        match connections.send(id, &payload, frame).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("failed to push state to {id:?}: {e}");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
