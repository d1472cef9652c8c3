//! Client side of the game socket: connect, reconnect, dispatch

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::input::ControllerSnapshot;
use crate::ws::protocol::{decode_server_text, encode_action, ClientAction, ServerMsg};

type ClientSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound frames allowed to wait for the socket writer. A quarter second
/// of controller snapshots at 60 Hz; anything beyond that is stale input.
pub const OUTBOUND_QUEUE_LEN: usize = 16;

/// Connection indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Fixed-delay reconnect bookkeeping. At most one attempt is pending at a
/// time; a close reported while one is pending schedules nothing.
#[derive(Debug)]
pub struct ReconnectScheduler {
    delay: Duration,
    pending: bool,
    scheduled: u64,
}

impl ReconnectScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: false,
            scheduled: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Connection closed or failed: delay before the next attempt
    pub fn on_closed(&mut self) -> Option<Duration> {
        if self.pending {
            return None;
        }
        self.pending = true;
        self.scheduled += 1;
        Some(self.delay)
    }

    /// The pending attempt has started
    pub fn on_attempt(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn scheduled_count(&self) -> u64 {
        self.scheduled
    }
}

/// Outcome of handling one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Game state replaced
    GameState,
    /// Video frame handed to the display writer
    FrameQueued,
    /// Video frame skipped because the display writer is behind
    FrameDropped,
    /// Text frame that failed to parse
    Malformed,
    /// Anything else (unknown type, control frames)
    Ignored,
}

/// Owns the single live connection to the game server
pub struct Transport {
    url: String,
    state_tx: watch::Sender<ConnectionState>,
    /// Outbound queue of the open connection, if any
    link: Mutex<Option<mpsc::Sender<Message>>>,
    reconnect: Mutex<ReconnectScheduler>,
}

impl Transport {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            url: url.into(),
            state_tx,
            link: Mutex::new(None),
            reconnect: Mutex::new(ReconnectScheduler::new(reconnect_delay)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.link.lock().is_some()
    }

    pub fn reconnects_scheduled(&self) -> u64 {
        self.reconnect.lock().scheduled_count()
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            info!(state = state.label(), "Connection state changed");
            *current = state;
            true
        });
    }

    /// Open the outbound link and mark the connection up
    pub fn attach(&self) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_LEN);
        *self.link.lock() = Some(tx);
        self.set_state(ConnectionState::Connected);
        rx
    }

    /// Drop the outbound link and mark the connection down
    pub fn detach(&self) {
        self.link.lock().take();
        self.set_state(ConnectionState::Disconnected);
    }

    /// Queue a frame on the open link without waiting. `Closed` also covers
    /// "no link at all".
    fn try_send(&self, msg: Message) -> Result<(), TrySendError<Message>> {
        match self.link.lock().as_ref() {
            Some(tx) => tx.try_send(msg),
            None => Err(TrySendError::Closed(msg)),
        }
    }

    /// Send a command if connected; silently dropped otherwise
    pub fn send_action(&self, action: &ClientAction) -> bool {
        let text = match encode_action(action) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to encode action");
                return false;
            }
        };

        match self.try_send(Message::Text(text)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(action = ?action, "Outbound queue full, action dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(action = ?action, "Not connected, action dropped");
                false
            }
        }
    }

    /// Send the controller snapshot as a binary frame if connected. A stalled
    /// socket drops the frame; the next tick carries fresher input anyway.
    pub fn send_controller(&self, snapshot: &ControllerSnapshot) -> bool {
        match self.try_send(Message::Binary(snapshot.as_bytes().to_vec())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Outbound queue full, controller frame dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Connect, serve the session, and reconnect after the fixed delay.
    /// Runs until the task is dropped.
    pub async fn run(self: Arc<Self>, app: AppState) {
        let url = self.url.clone();
        self.run_with(app, move || {
            let url = url.clone();
            async move { connect_async(url.as_str()).await.map(|(socket, _response)| socket) }
        })
        .await
    }

    /// The run loop over any way of opening the socket
    pub(crate) async fn run_with<D, F>(self: Arc<Self>, app: AppState, mut dial: D)
    where
        D: FnMut() -> F,
        F: Future<Output = Result<ClientSocket, WsError>>,
    {
        loop {
            self.reconnect.lock().on_attempt();
            self.set_state(ConnectionState::Connecting);

            let connection_id = Uuid::new_v4();
            debug!(connection_id = %connection_id, url = %self.url, "Connecting to game server");

            match dial().await {
                Ok(socket) => {
                    info!(connection_id = %connection_id, "Connected to game server");
                    self.run_session(connection_id, socket, &app).await;
                }
                Err(e) => {
                    warn!(connection_id = %connection_id, error = %e, "Connection attempt failed");
                }
            }

            self.detach();

            // on_attempt cleared the pending flag, so this close always schedules
            let scheduled = self.reconnect.lock().on_closed();
            debug_assert!(scheduled.is_some(), "reconnect already pending after an attempt");
            let delay = match scheduled {
                Some(delay) => delay,
                None => self.reconnect.lock().delay(),
            };
            info!(delay_ms = delay.as_millis() as u64, "Reconnecting");
            tokio::time::sleep(delay).await;
        }
    }

    async fn run_session(&self, connection_id: Uuid, socket: ClientSocket, app: &AppState) {
        let (mut ws_sink, mut ws_stream) = socket.split();
        let mut outbound_rx = self.attach();

        // Writer task: outbound queue -> socket
        let writer_handle = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                if let Err(e) = ws_sink.send(msg).await {
                    debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                    break;
                }
            }
        });

        // Reader loop: socket -> app state
        while let Some(result) = ws_stream.next().await {
            match result {
                Ok(Message::Close(frame)) => {
                    info!(connection_id = %connection_id, frame = ?frame, "Server closed connection");
                    break;
                }
                Ok(msg) => {
                    dispatch_inbound(app, msg);
                }
                Err(e) => {
                    error!(connection_id = %connection_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }

        self.detach();
        writer_handle.abort();
    }
}

/// Route one inbound frame: text is game state, binary is video
pub fn dispatch_inbound(app: &AppState, msg: Message) -> Dispatch {
    match msg {
        Message::Text(text) => match decode_server_text(&text) {
            Ok(ServerMsg::GameState(state)) => {
                app.apply_game_state(state);
                Dispatch::GameState
            }
            Ok(ServerMsg::Unknown) => {
                debug!("Ignoring unhandled server message type");
                Dispatch::Ignored
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse server message");
                Dispatch::Malformed
            }
        },
        Message::Binary(data) => {
            if app.video.submit(Bytes::from(data)) {
                Dispatch::FrameQueued
            } else {
                Dispatch::FrameDropped
            }
        }
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Dispatch::Ignored,
        Message::Close(_) => Dispatch::Ignored,
    }
}
