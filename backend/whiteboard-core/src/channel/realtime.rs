use crate::channel::event::{ChannelEvent, ChannelEventKind, ConnectionId};
use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use url::Url;

/// How long a client-initiated close waits for the server's close reply.
const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// How long [`RealtimeChannel::close`] waits for an open connection's task before aborting it.
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const CLOSE_REASON_CLIENT: &str = "1000 (closed by client)";
const CLOSE_REASON_ABANDONED: &str = "1000 (closed by client while connecting)";
const CLOSE_REASON_DROPPED: &str = "1006 (connection dropped)";
const CLOSE_REASON_NO_FRAME: &str = "1005";

/// Result of a best-effort [`RealtimeChannel::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The channel was not open. Nothing was queued.
    Dropped,
}

enum Outbound {
    Frame(String),
    Close,
}

struct Connection {
    id: ConnectionId,
    outbound: UnboundedSender<Outbound>,
    open: Arc<AtomicBool>,
    terminated: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Owner of the one outbound websocket.
///
/// Created together with the receiving end of its event queue; whoever holds
/// the receiver sees every event of every connection in order.
pub struct RealtimeChannel {
    events: UnboundedSender<ChannelEvent>,
    current: Option<Connection>,
}

impl RealtimeChannel {
    pub fn new() -> (Self, UnboundedReceiver<ChannelEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                events,
                current: None,
            },
            receiver,
        )
    }

    /// Start connecting to `endpoint` and return the new connection's id.
    ///
    /// Does not wait for the handshake: success arrives as `Opened`, failure as
    /// `Closed`. A connection that is still current is asked to close and
    /// becomes stale; its remaining events keep their old id.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&mut self, endpoint: &Url) -> ConnectionId {
        if let Some(previous) = self.current.take() {
            info!("Superseding connection {}", previous.id);
            tokio::spawn(retire(previous, self.events.clone()));
        }

        let id = ConnectionId::generate();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let terminated = Arc::new(AtomicBool::new(false));

        info!("Connection {id} connecting to {endpoint}");
        let task = tokio::spawn(drive_connection(
            endpoint.to_string(),
            id,
            self.events.clone(),
            outbound_rx,
            Arc::clone(&open),
            Arc::clone(&terminated),
        ));

        self.current = Some(Connection {
            id,
            outbound: outbound_tx,
            open,
            terminated,
            task,
        });

        id
    }

    /// Id of the connection started by the most recent `connect`, unless closed since.
    pub fn current_connection(&self) -> Option<ConnectionId> {
        self.current.as_ref().map(|connection| connection.id)
    }

    pub fn is_open(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|connection| connection.open.load(Ordering::SeqCst))
    }

    /// Transmit `{"action": action, ...payload}` if the channel is open.
    ///
    /// Best effort: when the channel is not open the command is dropped, not
    /// queued, and `Ok(SendOutcome::Dropped)` is returned. Commands sent over
    /// this channel are ephemeral operator actions the operator can repeat.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Encode`] if `payload` does not serialize to a
    /// JSON object.
    #[track_caller]
    pub fn send<P: Serialize>(&self, action: &str, payload: &P) -> Result<SendOutcome, ChannelError> {
        let Some(connection) = self
            .current
            .as_ref()
            .filter(|connection| connection.open.load(Ordering::SeqCst))
        else {
            debug!("Dropping '{action}' command: channel not open");
            return Ok(SendOutcome::Dropped);
        };

        let frame = encode_command(action, payload)?;

        if connection.outbound.send(Outbound::Frame(frame)).is_err() {
            debug!(
                "Dropping '{action}' command: connection {} already finished",
                connection.id
            );
            return Ok(SendOutcome::Dropped);
        }

        debug!("Sent '{action}' command on connection {}", connection.id);
        Ok(SendOutcome::Sent)
    }

    /// Close the current connection and wait for its task to finish.
    ///
    /// Once this returns, the closed connection emits nothing further and its
    /// terminal `Closed` event is queued. A connection still in its handshake
    /// is aborted rather than closed, so this never waits on a server that
    /// has not answered the upgrade.
    pub async fn close(&mut self) {
        let Some(connection) = self.current.take() else {
            return;
        };

        retire(connection, self.events.clone()).await;
    }
}

/// Tear down `connection` and queue its `Closed` if its task did not.
async fn retire(connection: Connection, events: UnboundedSender<ChannelEvent>) {
    let Connection {
        id,
        outbound,
        open,
        terminated,
        task,
    } = connection;

    if !open.load(Ordering::SeqCst) {
        task.abort();
        let _ = task.await;
        if emit_closed(&events, id, &terminated, CLOSE_REASON_ABANDONED.to_string()) {
            info!("Connection {id} abandoned before it opened");
        }
        return;
    }

    let _ = outbound.send(Outbound::Close);
    let abort = task.abort_handle();

    if tokio::time::timeout(TEARDOWN_TIMEOUT, task).await.is_err() {
        abort.abort();
        warn!("Connection {id} did not finish closing, aborted");
        emit_closed(
            &events,
            id,
            &terminated,
            format!("{CLOSE_REASON_CLIENT} after timeout"),
        );
    }

    debug!("Connection {id} closed");
}

/// Queue the connection's one `Closed`. Returns false if it was already queued.
fn emit_closed(
    events: &UnboundedSender<ChannelEvent>,
    id: ConnectionId,
    terminated: &AtomicBool,
    reason: String,
) -> bool {
    if terminated.swap(true, Ordering::SeqCst) {
        return false;
    }

    let _ = events.send(ChannelEvent {
        connection: id,
        kind: ChannelEventKind::Closed(reason),
    });
    true
}

/// Serialize a command frame. `action` wins over an `action` field in the payload.
#[track_caller]
pub(crate) fn encode_command<P: Serialize>(action: &str, payload: &P) -> Result<String, ChannelError> {
    let mut frame = Map::new();

    match serde_json::to_value(payload)? {
        Value::Object(fields) => frame.extend(fields),
        Value::Null => {}
        other => {
            return Err(ChannelError::Encode {
                message: format!("command payload must be a JSON object, got {other}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    }

    frame.insert("action".to_string(), Value::String(action.to_string()));
    Ok(Value::Object(frame).to_string())
}

pub(crate) fn describe_close(frame: Option<&CloseFrame>) -> String {
    match frame {
        Some(frame) => {
            let code = u16::from(frame.code);
            if frame.reason.as_str().is_empty() {
                code.to_string()
            } else {
                format!("{code} ({})", frame.reason.as_str())
            }
        }
        None => CLOSE_REASON_NO_FRAME.to_string(),
    }
}

/// Runs one connection to completion and emits its single `Closed`.
async fn drive_connection(
    endpoint: String,
    id: ConnectionId,
    events: UnboundedSender<ChannelEvent>,
    outbound: UnboundedReceiver<Outbound>,
    open: Arc<AtomicBool>,
    terminated: Arc<AtomicBool>,
) {
    let reason = run_connection(&endpoint, id, &events, outbound, &open).await;
    open.store(false, Ordering::SeqCst);

    info!("Connection {id} closed: {reason}");
    emit_closed(&events, id, &terminated, reason);
}

/// Returns the close reason.
async fn run_connection(
    endpoint: &str,
    id: ConnectionId,
    events: &UnboundedSender<ChannelEvent>,
    mut outbound: UnboundedReceiver<Outbound>,
    open: &AtomicBool,
) -> String {
    let emit = |kind: ChannelEventKind| {
        let _ = events.send(ChannelEvent {
            connection: id,
            kind,
        });
    };

    let (stream, _response) = match connect_async(endpoint).await {
        Ok(connected) => connected,
        Err(e) => {
            warn!("Connection {id} to {endpoint} failed: {e}");
            return format!("connect failed: {e}");
        }
    };

    open.store(true, Ordering::SeqCst);
    info!("Connection {id} open");
    emit(ChannelEventKind::Opened);

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    emit(ChannelEventKind::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => emit(ChannelEventKind::Message(text)),
                    Err(e) => warn!("Connection {id} sent non-UTF-8 binary frame: {e}"),
                },
                Some(Ok(Message::Close(frame))) => return describe_close(frame.as_ref()),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(ChannelEventKind::TransportError(e.to_string()));
                    return format!("1006 ({e})");
                }
                None => return CLOSE_REASON_DROPPED.to_string(),
            },
            command = outbound.recv() => match command {
                Some(Outbound::Frame(text)) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        emit(ChannelEventKind::TransportError(e.to_string()));
                        return format!("1006 ({e})");
                    }
                }
                Some(Outbound::Close) | None => {
                    open.store(false, Ordering::SeqCst);
                    let _ = write.send(Message::Close(None)).await;
                    let _ = tokio::time::timeout(CLOSE_HANDSHAKE_TIMEOUT, async {
                        while let Some(Ok(frame)) = read.next().await {
                            if frame.is_close() {
                                break;
                            }
                        }
                    })
                    .await;
                    return CLOSE_REASON_CLIENT.to_string();
                }
            },
        }
    }
}
