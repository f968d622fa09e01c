//! Runs a [`ProtocolStateMachine`] on a dedicated task.
//!
//! The task owns the machine and is the only code that touches session or
//! channel state. Operator commands and channel events are fed to it one at a
//! time, so there is never more than one input being processed.
//!
//! Readers get the current [`SessionState`] from a watch channel instead of
//! asking the task.

use crate::channel::ChannelEvent;
use crate::effects::{AudioAlert, CallPlacement};
use crate::error::protocol::ProtocolError;
use crate::protocol::machine::{Command, ProtocolStateMachine, SessionState};
use crate::render::OperatorView;
use crate::session::Session;

use common::ErrorLocation;

use std::panic::Location;

use log::{info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cloneable handle to a running machine.
///
/// All clones drive the same machine. When the last one is dropped the task
/// closes the channel and exits.
#[derive(Clone)]
pub struct WhiteboardHandle {
    command_tx: UnboundedSender<Command>,
    state_rx: watch::Receiver<SessionState>,
}

impl WhiteboardHandle {
    #[track_caller]
    pub fn authenticate(&self, session: Session) -> Result<(), ProtocolError> {
        self.send(Command::Authenticate(session))
    }

    #[track_caller]
    pub fn clear(&self) -> Result<(), ProtocolError> {
        self.send(Command::ClearSurface)
    }

    #[track_caller]
    pub fn logout(&self) -> Result<(), ProtocolError> {
        self.send(Command::Logout)
    }

    /// State after the last processed input.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Receiver that wakes on every state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    #[track_caller]
    fn send(&self, command: Command) -> Result<(), ProtocolError> {
        let location = ErrorLocation::from(Location::caller());
        self.command_tx
            .send(command)
            .map_err(|e| ProtocolError::MachineStopped {
                message: format!("Machine task stopped: {e}"),
                location,
            })
    }
}

/// Spawn `machine` with the receiving end of its channel's event queue.
///
/// # Panics
///
/// Must be called from within a tokio runtime.
pub fn spawn<V, C, A>(
    machine: ProtocolStateMachine<V, C, A>,
    events: UnboundedReceiver<ChannelEvent>,
) -> (WhiteboardHandle, JoinHandle<()>)
where
    V: OperatorView,
    C: CallPlacement,
    A: AudioAlert,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(machine.state());

    let task = tokio::spawn(machine_task(machine, command_rx, events, state_tx));

    (
        WhiteboardHandle {
            command_tx,
            state_rx,
        },
        task,
    )
}

async fn machine_task<V, C, A>(
    mut machine: ProtocolStateMachine<V, C, A>,
    mut commands: UnboundedReceiver<Command>,
    mut events: UnboundedReceiver<ChannelEvent>,
    state_tx: watch::Sender<SessionState>,
) where
    V: OperatorView,
    C: CallPlacement,
    A: AudioAlert,
{
    info!("Whiteboard machine started");

    loop {
        tokio::select! {
            // Channel events take priority over operator commands
            biased;
            Some(event) = events.recv() => machine.handle_channel_event(event).await,
            command = commands.recv() => match command {
                Some(command) => machine.handle_command(command).await,
                None => break,
            },
        }

        state_tx.send_if_modified(|state| {
            let next = machine.state();
            let changed = *state != next;
            *state = next;
            changed
        });
    }

    machine.shutdown().await;
    let _ = state_tx.send(SessionState::LoggedOut);
    warn!("Whiteboard machine stopped: all handles dropped");
}
