use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tandem_core::model::SessionId;
use webrtc::track::track_remote::TrackRemote;

/// Where the session currently stands. The names double as the values
/// presentation layers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomState {
    /// Alone in the room.
    Waiting,
    /// Two members present, no call running.
    CanCall,
    /// We invited the other member and wait for their verdict.
    Calling,
    /// The other member invited us.
    Ringing,
    /// Invitation accepted, media negotiation running.
    Connecting,
    /// Remote media is flowing.
    Connected,
    /// Our invitation was declined.
    Rejected,
    /// The room already had two members.
    Full,
    /// The call or the room attempt is over.
    Ended,
}

impl RoomState {
    /// States in which a call attempt is underway and a hangup, local
    /// or remote, has something to tear down.
    pub fn in_call(&self) -> bool {
        matches!(
            self,
            Self::Calling | Self::Ringing | Self::Connecting | Self::Connected
        )
    }

    /// States in which this session holds a seat in the room.
    pub fn in_room(&self) -> bool {
        !matches!(self, Self::Full | Self::Ended)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "waiting",
            Self::CanCall => "canCall",
            Self::Calling => "calling",
            Self::Ringing => "ringing",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Rejected => "rejected",
            Self::Full => "full",
            Self::Ended => "ended",
        };
        write!(f, "{}", name)
    }
}

/// Blocking conditions surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    /// The peer connection could not be set up; the call attempt was
    /// abandoned.
    CannotStartCall,
}

/// What the presentation layer observes. Published through a watch
/// channel on every change.
#[derive(Clone)]
pub struct RoomSnapshot {
    pub state: RoomState,
    /// Identity of the current call attempt.
    pub session: SessionId,
    /// The other member's display name, once a call has touched this
    /// session.
    pub peer_name: Option<String>,
    /// Remote media, populated while connected.
    pub remote_tracks: Vec<Arc<TrackRemote>>,
    pub notice: Option<SessionNotice>,
}

impl RoomSnapshot {
    pub(crate) fn initial(session: SessionId) -> Self {
        Self {
            state: RoomState::Waiting,
            session,
            peer_name: None,
            remote_tracks: Vec::new(),
            notice: None,
        }
    }
}
