use crate::error::CallError;
use crate::session::command::SessionCommand;
use crate::session::state::RoomSnapshot;
use tokio::sync::{mpsc, watch};

/// Cheap clonable handle to a running session. Dropping every clone
/// shuts the session down.
#[derive(Clone)]
pub struct RoomHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    snapshot_rx: watch::Receiver<RoomSnapshot>,
}

impl RoomHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<SessionCommand>,
        snapshot_rx: watch::Receiver<RoomSnapshot>,
    ) -> Self {
        Self {
            command_tx,
            snapshot_rx,
        }
    }

    pub async fn start_call(&self) -> Result<(), CallError> {
        self.send(SessionCommand::StartCall).await
    }

    pub async fn accept_call(&self) -> Result<(), CallError> {
        self.send(SessionCommand::AcceptCall).await
    }

    pub async fn reject_call(&self) -> Result<(), CallError> {
        self.send(SessionCommand::RejectCall).await
    }

    pub async fn end_call(&self) -> Result<(), CallError> {
        self.send(SessionCommand::EndCall).await
    }

    pub async fn rejoin(&self) -> Result<(), CallError> {
        self.send(SessionCommand::Rejoin).await
    }

    pub async fn shutdown(&self) -> Result<(), CallError> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Current view of the session.
    pub fn snapshot(&self) -> RoomSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn watch(&self) -> watch::Receiver<RoomSnapshot> {
        self.snapshot_rx.clone()
    }

    async fn send(&self, command: SessionCommand) -> Result<(), CallError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| CallError::SessionClosed)
    }
}
