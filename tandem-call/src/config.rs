use tandem_core::model::{IceServerConfig, RoomName};

/// ICE configuration handed to every peer connection attempt.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::google_stun()],
        }
    }
}

impl PeerConfig {
    /// No ICE servers at all. Host candidates only, which is what
    /// loopback setups want.
    pub fn none() -> Self {
        Self {
            ice_servers: vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub room: RoomName,
    /// Name shown to the other member in call invitations.
    pub display_name: String,
    pub peer: PeerConfig,
}

impl SessionConfig {
    pub fn new(room: impl Into<RoomName>, display_name: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            display_name: display_name.into(),
            peer: PeerConfig::default(),
        }
    }

    pub fn with_peer(mut self, peer: PeerConfig) -> Self {
        self.peer = peer;
        self
    }
}
