use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::protocol::{MalformedMessage, Message};
use crate::relay::{ConnId, Outbound, RelayConfig, RoomRegistry};
use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};

struct RelayState {
    registry: RoomRegistry,
    outboxes: HashMap<ConnId, UnboundedSender<Message>>,
}

struct Shared {
    config: RelayConfig,
    state: Mutex<RelayState>,
    next_conn: AtomicU64,
}

/// Relay server. Cheap to clone; clones share the same rooms.
///
/// Each connection runs in its own task, racing inbound frames against an
/// outbox that other connections' tasks push to. The registry lock is never
/// held across an `.await`.
#[derive(Clone)]
pub struct Relay {
    shared: Arc<Shared>,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        Self::with_registry(config, RoomRegistry::new())
    }

    pub fn with_registry(config: RelayConfig, registry: RoomRegistry) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(RelayState {
                    registry,
                    outboxes: HashMap::new(),
                }),
                next_conn: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.shared.config
    }

    fn state(&self) -> MutexGuard<'_, RelayState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of open rooms.
    pub fn room_count(&self) -> usize {
        self.state().registry.room_count()
    }

    /// Bind the configured address and serve until the listener fails.
    pub async fn bind_and_serve(&self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.shared.config.bind).await?;
        log::info!("[Relay] listening on {}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Accept TCP connections from `listener`, one task per connection.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        let sweeper = self.spawn_sweeper();
        let result = loop {
            let (stream, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => break Err(anyhow::anyhow!("Accept failed: {}", e)),
            };
            log::debug!("[Relay] accepted {}", addr);
            let transport = TcpTransport::with_config(stream, self.shared.config.transport);
            let relay = self.clone();
            tokio::spawn(async move { relay.handle_connection(transport).await });
        };
        sweeper.abort();
        result
    }

    /// Open an in-process connection to this relay.
    pub fn connect_in_memory(&self) -> InMemoryTransport {
        let (client, server) = InMemoryTransport::pair();
        let relay = self.clone();
        tokio::spawn(async move { relay.handle_connection(server).await });
        client
    }

    /// Periodically close idle rooms.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let relay = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(relay.shared.config.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                relay.sweep(Instant::now());
            }
        })
    }

    /// Expire rooms idle at `now`. Returns the number of notifications sent.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut state = self.state();
        let out = state
            .registry
            .expire_idle(now, self.shared.config.room_timeout);
        let count = out.len();
        Self::dispatch(&state, out);
        count
    }

    fn dispatch(state: &RelayState, out: Vec<Outbound>) {
        for Outbound { to, msg } in out {
            match state.outboxes.get(&to) {
                Some(tx) => {
                    if tx.send(msg).is_err() {
                        log::debug!("[Relay] connection {} already closing", to);
                    }
                }
                None => log::debug!("[Relay] no outbox for connection {}", to),
            }
        }
    }

    fn on_message(&self, conn: ConnId, msg: Message) {
        log::debug!("[Relay] connection {} sent {}", conn, msg.kind());
        let mut state = self.state();
        let out = state.registry.handle(conn, msg, Instant::now());
        Self::dispatch(&state, out);
    }

    fn on_malformed(&self, conn: ConnId, err: &MalformedMessage) {
        log::warn!("[Relay] connection {}: {}", conn, err);
        let state = self.state();
        Self::dispatch(
            &state,
            vec![Outbound {
                to: conn,
                msg: Message::error("Malformed message"),
            }],
        );
    }

    fn on_disconnect(&self, conn: ConnId) {
        let mut state = self.state();
        state.outboxes.remove(&conn);
        let out = state.registry.disconnect(conn);
        Self::dispatch(&state, out);
    }

    /// Serve one connection until it closes.
    pub async fn handle_connection<T: Transport>(&self, mut transport: T) {
        let conn = self.shared.next_conn.fetch_add(1, Ordering::Relaxed);
        let (tx, mut outbox) = unbounded_channel();
        self.state().outboxes.insert(conn, tx);
        log::debug!("[Relay] connection {} opened", conn);

        loop {
            tokio::select! {
                inbound = transport.recv() => match inbound {
                    Ok(msg) => self.on_message(conn, msg),
                    Err(e) => match e.downcast_ref::<MalformedMessage>() {
                        Some(bad) => self.on_malformed(conn, bad),
                        None => {
                            log::debug!("[Relay] connection {} closed: {}", conn, e);
                            break;
                        }
                    },
                },
                Some(msg) = outbox.recv() => {
                    if let Err(e) = transport.send(msg).await {
                        log::warn!("[Relay] send to connection {} failed: {}", conn, e);
                        break;
                    }
                }
            }
        }

        self.on_disconnect(conn);
    }
}
