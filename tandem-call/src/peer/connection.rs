use crate::config::PeerConfig;
use crate::device::LocalMedia;
use crate::error::CallError;
use crate::peer::peer_event::PeerEvent;
use crate::signaling::SignalingChannel;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tandem_core::model::{ClientEvent, RoomName, SessionId, SignalMessage};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit};
use webrtc::track::track_remote::TrackRemote;

/// One native peer connection for one call attempt.
///
/// The wrapper emits every outbound offer, answer and candidate itself
/// through the signaling channel; the session loop only decides *when*
/// negotiation steps happen. Inbound happenings (remote media, loss of
/// the connection) flow back to the loop as [`PeerEvent`]s tagged with
/// this attempt's session id.
pub struct PeerConnection {
    session: SessionId,
    room: RoomName,
    channel: Arc<dyn SignalingChannel>,
    peer_connection: Arc<RTCPeerConnection>,
    pending_candidates: Mutex<Vec<RTCIceCandidateInit>>,
    remote_tracks: Arc<Mutex<Vec<Arc<TrackRemote>>>>,
    closed: Arc<AtomicBool>,
}

impl PeerConnection {
    pub async fn connect(
        session: SessionId,
        room: RoomName,
        config: PeerConfig,
        channel: Arc<dyn SignalingChannel>,
        event_tx: mpsc::Sender<PeerEvent>,
        local: Option<LocalMedia>,
    ) -> Result<Self, CallError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(CallError::PeerSetup)?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(CallError::PeerSetup)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = config
            .ice_servers
            .into_iter()
            .map(|server| RTCIceServer {
                urls: server.urls,
                username: server.username.unwrap_or_default(),
                credential: server.credential.unwrap_or_default(),
            })
            .collect();

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(CallError::PeerSetup)?,
        );

        // Sending tracks go in as-is. Kinds we do not send still get a
        // receive-only transceiver, so the offer solicits both audio
        // and video from the other side.
        let mut sends_audio = false;
        let mut sends_video = false;
        if let Some(media) = local {
            sends_audio = media.has_kind(RTPCodecType::Audio);
            sends_video = media.has_kind(RTPCodecType::Video);
            for track in media.tracks {
                peer_connection
                    .add_track(track)
                    .await
                    .map_err(CallError::Media)?;
            }
        }
        for (sends, kind) in [
            (sends_audio, RTPCodecType::Audio),
            (sends_video, RTPCodecType::Video),
        ] {
            if sends {
                continue;
            }
            peer_connection
                .add_transceiver_from_kind(
                    kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Recvonly,
                        send_encodings: vec![],
                    }),
                )
                .await
                .map_err(CallError::PeerSetup)?;
        }

        let remote_tracks: Arc<Mutex<Vec<Arc<TrackRemote>>>> = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let state_tx = event_tx.clone();
        let state_closed = closed.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let closed = state_closed.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", state);
                    match state {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            if closed.load(Ordering::SeqCst) {
                                return;
                            }
                            let _ = tx.send(PeerEvent::Disconnected { session }).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        let ice_channel = channel.clone();
        let ice_room = room.clone();
        let ice_closed = closed.clone();
        peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let channel = ice_channel.clone();
            let room = ice_room.clone();
            let closed = ice_closed.clone();

            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                if closed.load(Ordering::SeqCst) {
                    return;
                }
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let payload = SignalMessage::Candidate {
                    sdp_mline_index: init.sdp_mline_index,
                    sdp_mid: init.sdp_mid,
                    candidate: init.candidate,
                };
                if let Err(e) = channel
                    .send(&room, ClientEvent::Message { payload })
                    .await
                {
                    warn!("Failed to relay ICE candidate: {}", e);
                }
            })
        }));

        let track_tx = event_tx.clone();
        let track_store = remote_tracks.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let store = track_store.clone();

                Box::pin(async move {
                    let kind = track.kind();
                    debug!("Remote {:?} track arrived", kind);
                    store.lock().await.push(track);
                    let _ = tx.send(PeerEvent::RemoteTrack { session, kind }).await;
                })
            },
        ));

        Ok(Self {
            session,
            room,
            channel,
            peer_connection,
            pending_candidates: Mutex::new(Vec::new()),
            remote_tracks,
            closed,
        })
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Create an offer, install it locally and relay it.
    pub async fn send_offer(&self) -> Result<(), CallError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(CallError::Negotiation)?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(CallError::Negotiation)?;

        self.send_signal(SignalMessage::Offer { sdp: offer.sdp }).await
    }

    /// Apply a remote offer, then answer it and relay the answer.
    pub async fn accept_offer(&self, sdp: String) -> Result<(), CallError> {
        let offer = RTCSessionDescription::offer(sdp).map_err(CallError::Negotiation)?;
        self.peer_connection
            .set_remote_description(offer)
            .await
            .map_err(CallError::Negotiation)?;
        self.flush_pending_candidates().await;

        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(CallError::Negotiation)?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(CallError::Negotiation)?;

        self.send_signal(SignalMessage::Answer { sdp: answer.sdp }).await
    }

    /// Apply the remote answer to our earlier offer.
    pub async fn accept_answer(&self, sdp: String) -> Result<(), CallError> {
        let answer = RTCSessionDescription::answer(sdp).map_err(CallError::Negotiation)?;
        self.peer_connection
            .set_remote_description(answer)
            .await
            .map_err(CallError::Negotiation)?;
        self.flush_pending_candidates().await;
        Ok(())
    }

    /// Apply a remote candidate, or hold it until a remote description
    /// exists to attach it to.
    pub async fn add_remote_candidate(&self, candidate: RTCIceCandidateInit) -> Result<(), CallError> {
        if self.peer_connection.remote_description().await.is_none() {
            debug!("Holding ICE candidate until the remote description lands");
            self.pending_candidates.lock().await.push(candidate);
            return Ok(());
        }
        self.peer_connection
            .add_ice_candidate(candidate)
            .await
            .map_err(CallError::Negotiation)
    }

    async fn flush_pending_candidates(&self) {
        let held: Vec<_> = self.pending_candidates.lock().await.drain(..).collect();
        for candidate in held {
            if let Err(e) = self.peer_connection.add_ice_candidate(candidate).await {
                warn!("Failed to apply held ICE candidate: {:?}", e);
            }
        }
    }

    pub async fn remote_tracks(&self) -> Vec<Arc<TrackRemote>> {
        self.remote_tracks.lock().await.clone()
    }

    /// Close the native connection. Safe to call more than once; only
    /// the first call does anything.
    pub async fn close(&self) -> Result<(), CallError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.peer_connection
            .close()
            .await
            .map_err(CallError::Teardown)?;
        Ok(())
    }

    async fn send_signal(&self, payload: SignalMessage) -> Result<(), CallError> {
        self.channel
            .send(&self.room, ClientEvent::Message { payload })
            .await?;
        Ok(())
    }
}
