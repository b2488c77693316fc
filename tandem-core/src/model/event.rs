use crate::model::room::RoomName;
use crate::model::signaling::SignalMessage;
use serde::{Deserialize, Serialize};

/// Events a client emits toward the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientEvent {
    CreateOrJoin,
    CallInitiated { caller: String },
    CallAccepted { callee: String },
    CallRejected,
    Message { payload: SignalMessage },
    LeaveRoom,
}

/// Events the relay delivers to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    Created,
    Joined,
    Full,
    CallInitiated { caller: String },
    CallAccepted { callee: String },
    CallRejected,
    Message { payload: SignalMessage },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEnvelope {
    pub room: RoomName,
    #[serde(flatten)]
    pub event: ClientEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEnvelope {
    #[serde(default)]
    pub room: Option<RoomName>,
    #[serde(flatten)]
    pub event: ServerEvent,
}

impl ClientEnvelope {
    pub fn new(room: RoomName, event: ClientEvent) -> Self {
        Self { room, event }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ServerEnvelope {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
