use crate::config::SessionConfig;
use crate::device::DeviceProvider;
use crate::peer::{PeerConnection, PeerEvent};
use crate::session::command::SessionCommand;
use crate::session::handle::RoomHandle;
use crate::session::state::{RoomSnapshot, RoomState, SessionNotice};
use crate::signaling::SignalingChannel;
use std::sync::Arc;
use tandem_core::model::{ClientEvent, ServerEvent, SessionId, SignalMessage};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::track::track_remote::TrackRemote;

/// The call state machine for one seat in one room.
///
/// Runs as its own task and owns everything about the attempt: the
/// room state, the caller/callee role, and the nullable slot holding
/// the peer connection of the current attempt. Commands arrive from
/// [`RoomHandle`]s, relay events from the signaling channel's
/// receiver, and peer events from the connection's callbacks; one
/// `select!` loop serializes them all.
pub struct RoomSession {
    config: SessionConfig,
    channel: Arc<dyn SignalingChannel>,
    devices: Arc<dyn DeviceProvider>,
    command_rx: mpsc::Receiver<SessionCommand>,
    server_rx: mpsc::UnboundedReceiver<ServerEvent>,
    peer_rx: mpsc::Receiver<PeerEvent>,
    peer_tx: mpsc::Sender<PeerEvent>,
    peer: Option<PeerConnection>,
    session: SessionId,
    is_initiator: bool,
    state: RoomState,
    peer_name: Option<String>,
    remote_tracks: Vec<Arc<TrackRemote>>,
    notice: Option<SessionNotice>,
    snapshot_tx: watch::Sender<RoomSnapshot>,
}

impl RoomSession {
    pub fn new(
        config: SessionConfig,
        channel: Arc<dyn SignalingChannel>,
        server_rx: mpsc::UnboundedReceiver<ServerEvent>,
        devices: Arc<dyn DeviceProvider>,
    ) -> (Self, RoomHandle) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (peer_tx, peer_rx) = mpsc::channel(256);
        let session = SessionId::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(RoomSnapshot::initial(session));

        let actor = Self {
            config,
            channel,
            devices,
            command_rx,
            server_rx,
            peer_rx,
            peer_tx,
            peer: None,
            session,
            is_initiator: false,
            state: RoomState::Waiting,
            peer_name: None,
            remote_tracks: Vec::new(),
            notice: None,
            snapshot_tx,
        };
        (actor, RoomHandle::new(command_tx, snapshot_rx))
    }

    /// Build a session and run it on its own task.
    pub fn spawn(
        config: SessionConfig,
        channel: Arc<dyn SignalingChannel>,
        server_rx: mpsc::UnboundedReceiver<ServerEvent>,
        devices: Arc<dyn DeviceProvider>,
    ) -> RoomHandle {
        let (session, handle) = Self::new(config, channel, server_rx, devices);
        tokio::spawn(session.run());
        handle
    }

    pub async fn run(mut self) {
        info!(
            "Session event loop started for room '{}'",
            self.config.room
        );

        if let Err(e) = self
            .channel
            .send(&self.config.room, ClientEvent::CreateOrJoin)
            .await
        {
            error!("Failed to join room '{}': {}", self.config.room, e);
            self.set_state(RoomState::Ended);
            return;
        }

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Shutdown) => {
                            self.shutdown().await;
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All handles dropped. Shutting down session.");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                evt = self.server_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_server_event(e).await,
                        None => {
                            warn!("Relay event stream closed");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                evt = self.peer_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_peer_event(e).await,
                        None => {
                            warn!("Peer event channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        info!("Session event loop finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::StartCall => {
                if self.state != RoomState::CanCall {
                    warn!("start_call ignored in state {}", self.state);
                    return;
                }
                let caller = self.config.display_name.clone();
                if let Err(e) = self
                    .channel
                    .send(&self.config.room, ClientEvent::CallInitiated { caller })
                    .await
                {
                    error!("Failed to send call invitation: {}", e);
                    return;
                }
                self.is_initiator = true;
                self.set_state(RoomState::Calling);
            }

            SessionCommand::AcceptCall => {
                if self.state != RoomState::Ringing {
                    warn!("accept_call ignored in state {}", self.state);
                    return;
                }
                let callee = self.config.display_name.clone();
                if let Err(e) = self
                    .channel
                    .send(&self.config.room, ClientEvent::CallAccepted { callee })
                    .await
                {
                    error!("Failed to send call acceptance: {}", e);
                    return;
                }
                self.is_initiator = false;
                self.set_state(RoomState::Connecting);
                self.build_peer().await;
            }

            SessionCommand::RejectCall => {
                if self.state != RoomState::Ringing {
                    warn!("reject_call ignored in state {}", self.state);
                    return;
                }
                if let Err(e) = self
                    .channel
                    .send(&self.config.room, ClientEvent::CallRejected)
                    .await
                {
                    error!("Failed to send call rejection: {}", e);
                    return;
                }
                self.peer_name = None;
                self.set_state(RoomState::Waiting);
            }

            SessionCommand::EndCall => self.teardown(true).await,

            SessionCommand::Rejoin => {
                if !matches!(self.state, RoomState::Ended | RoomState::Rejected) {
                    warn!("rejoin ignored in state {}", self.state);
                    return;
                }
                self.session = SessionId::new();
                self.is_initiator = false;
                self.peer_name = None;
                self.remote_tracks.clear();
                self.notice = None;
                if let Err(e) = self
                    .channel
                    .send(&self.config.room, ClientEvent::CreateOrJoin)
                    .await
                {
                    error!("Failed to rejoin room '{}': {}", self.config.room, e);
                    self.set_state(RoomState::Ended);
                    return;
                }
                info!("Rejoining room '{}' as session {}", self.config.room, self.session);
                self.set_state(RoomState::Waiting);
            }

            // Handled by the run loop so it can break.
            SessionCommand::Shutdown => {}
        }
    }

    async fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Created => {
                if self.state == RoomState::Waiting {
                    info!("Room '{}' created, waiting for a peer", self.config.room);
                } else {
                    warn!("Ignoring 'created' in state {}", self.state);
                }
            }

            ServerEvent::Joined => {
                if self.state == RoomState::Waiting {
                    info!("Both members present in room '{}'", self.config.room);
                    self.set_state(RoomState::CanCall);
                } else {
                    warn!("Ignoring 'joined' in state {}", self.state);
                }
            }

            ServerEvent::Full => {
                if matches!(self.state, RoomState::Waiting | RoomState::CanCall) {
                    info!("Room '{}' is already full", self.config.room);
                    self.set_state(RoomState::Full);
                } else {
                    warn!("Ignoring 'full' in state {}", self.state);
                }
            }

            ServerEvent::CallInitiated { caller } => {
                // An invitation rings through any out-of-call seated
                // state, so a rejected caller can be called back. Mid
                // call it is ignored, which is also what buries glare.
                if self.state.in_call() || !self.state.in_room() {
                    warn!("Ignoring call invitation in state {}", self.state);
                    return;
                }
                info!("Call invitation from '{}'", caller);
                self.peer_name = Some(caller);
                self.is_initiator = false;
                self.set_state(RoomState::Ringing);
            }

            ServerEvent::CallAccepted { callee } => {
                if self.state != RoomState::Calling {
                    warn!("Ignoring call acceptance in state {}", self.state);
                    return;
                }
                info!("'{}' accepted the call", callee);
                self.peer_name = Some(callee);
                self.set_state(RoomState::Connecting);
                self.build_peer().await;
                self.try_send_offer().await;
            }

            ServerEvent::CallRejected => {
                if !matches!(self.state, RoomState::Calling | RoomState::Ringing) {
                    warn!("Ignoring call rejection in state {}", self.state);
                    return;
                }
                info!("Call was rejected");
                self.set_state(RoomState::Rejected);
            }

            ServerEvent::Message { payload } => self.handle_signal(payload).await,
        }
    }

    async fn handle_signal(&mut self, message: SignalMessage) {
        match message {
            SignalMessage::Offer { sdp } => {
                if self.state != RoomState::Connecting || self.is_initiator {
                    warn!("Ignoring offer in state {}", self.state);
                    return;
                }
                // The offer can beat our own peer setup; build it on
                // the spot so the offer is never dropped.
                if self.peer.is_none() {
                    self.build_peer().await;
                }
                let Some(peer) = &self.peer else { return };
                if let Err(e) = peer.accept_offer(sdp).await {
                    error!("Failed to answer offer: {}", e);
                }
            }

            SignalMessage::Answer { sdp } => {
                if self.state != RoomState::Connecting || !self.is_initiator {
                    warn!("Ignoring answer in state {}", self.state);
                    return;
                }
                let Some(peer) = &self.peer else {
                    debug!("Dropping answer with no active peer");
                    return;
                };
                if let Err(e) = peer.accept_answer(sdp).await {
                    error!("Failed to apply answer: {}", e);
                }
            }

            SignalMessage::Candidate {
                sdp_mline_index,
                sdp_mid,
                candidate,
            } => {
                let Some(peer) = &self.peer else {
                    debug!("Dropping candidate with no active peer");
                    return;
                };
                let init = RTCIceCandidateInit {
                    candidate,
                    sdp_mid,
                    sdp_mline_index,
                    username_fragment: None,
                };
                if let Err(e) = peer.add_remote_candidate(init).await {
                    warn!("Failed to add ICE candidate: {}", e);
                }
            }

            SignalMessage::Hangup => {
                info!("Remote side hung up");
                self.teardown(false).await;
            }
        }
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) {
        if event.session() != self.session {
            debug!(
                "Dropping event from superseded session {}",
                event.session()
            );
            return;
        }

        match event {
            PeerEvent::RemoteTrack { kind, .. } => match self.state {
                RoomState::Connecting => {
                    info!("Remote {:?} arrived. Call is live.", kind);
                    self.refresh_remote_tracks().await;
                    self.set_state(RoomState::Connected);
                }
                RoomState::Connected => {
                    self.refresh_remote_tracks().await;
                    self.publish();
                }
                _ => debug!("Ignoring remote {:?} track in state {}", kind, self.state),
            },

            PeerEvent::Disconnected { .. } => {
                info!("Peer connection lost");
                self.teardown(false).await;
            }
        }
    }

    /// Offer creation is gated three ways: the call must be connecting,
    /// we must be the side that invited, and the peer connection must
    /// actually exist.
    async fn try_send_offer(&mut self) {
        if self.state != RoomState::Connecting || !self.is_initiator {
            return;
        }
        let Some(peer) = &self.peer else { return };
        if let Err(e) = peer.send_offer().await {
            error!("Failed to send offer: {}", e);
        }
    }

    async fn build_peer(&mut self) {
        // A denied microphone or missing camera is not fatal. The call
        // proceeds without local media and only receives.
        let local = match self.devices.local_media().await {
            Ok(media) => media,
            Err(e) => {
                warn!("Proceeding without local media: {}", e);
                None
            }
        };

        match PeerConnection::connect(
            self.session,
            self.config.room.clone(),
            self.config.peer.clone(),
            self.channel.clone(),
            self.peer_tx.clone(),
            local,
        )
        .await
        {
            Ok(peer) => self.peer = Some(peer),
            Err(e) => {
                error!("Failed to set up peer connection: {}", e);
                self.abandon_attempt().await;
            }
        }
    }

    /// Unrecoverable setup failure: tell the user, hang up so the
    /// other side does not wait forever, and end the attempt.
    async fn abandon_attempt(&mut self) {
        self.notice = Some(SessionNotice::CannotStartCall);
        self.teardown(true).await;
    }

    /// Shared teardown for local hangups, remote `bye`s and lost
    /// connections. Idempotent: once the attempt is over there is
    /// nothing left to do.
    async fn teardown(&mut self, locally_initiated: bool) {
        if !self.state.in_call() && self.peer.is_none() {
            debug!("Hangup with nothing to tear down");
            return;
        }

        if locally_initiated {
            if let Err(e) = self
                .channel
                .send(
                    &self.config.room,
                    ClientEvent::Message {
                        payload: SignalMessage::Hangup,
                    },
                )
                .await
            {
                warn!("Failed to send hangup notice: {}", e);
            }
        }

        if let Some(peer) = self.peer.take() {
            if let Err(e) = peer.close().await {
                warn!("Error closing peer connection: {}", e);
            }
        }
        self.devices.release().await;
        self.remote_tracks.clear();
        self.is_initiator = false;

        if let Err(e) = self
            .channel
            .send(&self.config.room, ClientEvent::LeaveRoom)
            .await
        {
            warn!("Failed to leave room '{}': {}", self.config.room, e);
        }

        self.set_state(RoomState::Ended);
    }

    async fn shutdown(&mut self) {
        if self.state.in_call() || self.peer.is_some() {
            self.teardown(true).await;
        } else if self.state.in_room() {
            if let Err(e) = self
                .channel
                .send(&self.config.room, ClientEvent::LeaveRoom)
                .await
            {
                warn!("Failed to leave room '{}': {}", self.config.room, e);
            }
            self.set_state(RoomState::Ended);
        }
    }

    async fn refresh_remote_tracks(&mut self) {
        if let Some(peer) = &self.peer {
            self.remote_tracks = peer.remote_tracks().await;
        }
    }

    fn set_state(&mut self, next: RoomState) {
        if self.state != next {
            info!("Room state: {} -> {}", self.state, next);
            self.state = next;
        }
        self.publish();
    }

    fn publish(&mut self) {
        let _ = self.snapshot_tx.send(RoomSnapshot {
            state: self.state,
            session: self.session,
            peer_name: self.peer_name.clone(),
            remote_tracks: self.remote_tracks.clone(),
            notice: self.notice,
        });
    }

    #[cfg(test)]
    pub(crate) fn peer_sender(&self) -> mpsc::Sender<PeerEvent> {
        self.peer_tx.clone()
    }
}
