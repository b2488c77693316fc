use tandem_core::model::SessionId;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;

/// Events a peer connection raises for the session loop. Every event
/// names the call attempt it belongs to, so the loop can drop anything
/// left over from an attempt that has since been torn down.
#[derive(Debug, Clone)]
pub enum PeerEvent {
    /// The remote side's media started arriving.
    RemoteTrack {
        session: SessionId,
        kind: RTPCodecType,
    },

    /// The underlying connection failed or was closed remotely.
    Disconnected { session: SessionId },
}

impl PeerEvent {
    pub fn session(&self) -> SessionId {
        match self {
            Self::RemoteTrack { session, .. } => *session,
            Self::Disconnected { session } => *session,
        }
    }
}
