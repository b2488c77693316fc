use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire form of a hangup notice: the bare JSON string `"bye"`, not a
/// tagged object like the other payloads.
pub const HANGUP_WORD: &str = "bye";

/// Payload relayed between the two room members through the `message`
/// event. Offer, answer and candidate are objects tagged by `type`;
/// hangup is the literal string `"bye"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalMessage {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        sdp_mline_index: Option<u16>,
        sdp_mid: Option<String>,
        candidate: String,
    },
    Hangup,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedSignal {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        #[serde(rename = "sdpMLineIndex")]
        sdp_mline_index: Option<u16>,
        #[serde(rename = "sdpMid")]
        sdp_mid: Option<String>,
        candidate: String,
    },
}

impl From<TaggedSignal> for SignalMessage {
    fn from(tagged: TaggedSignal) -> Self {
        match tagged {
            TaggedSignal::Offer { sdp } => Self::Offer { sdp },
            TaggedSignal::Answer { sdp } => Self::Answer { sdp },
            TaggedSignal::Candidate {
                sdp_mline_index,
                sdp_mid,
                candidate,
            } => Self::Candidate {
                sdp_mline_index,
                sdp_mid,
                candidate,
            },
        }
    }
}

impl Serialize for SignalMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Hangup => serializer.serialize_str(HANGUP_WORD),
            Self::Offer { sdp } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "offer")?;
                map.serialize_entry("sdp", sdp)?;
                map.end()
            }
            Self::Answer { sdp } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "answer")?;
                map.serialize_entry("sdp", sdp)?;
                map.end()
            }
            Self::Candidate {
                sdp_mline_index,
                sdp_mid,
                candidate,
            } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "candidate")?;
                map.serialize_entry("sdpMLineIndex", sdp_mline_index)?;
                map.serialize_entry("sdpMid", sdp_mid)?;
                map.serialize_entry("candidate", candidate)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for SignalMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.as_str() == Some(HANGUP_WORD) {
            return Ok(Self::Hangup);
        }
        TaggedSignal::deserialize(value)
            .map(Self::from)
            .map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn google_stun() -> Self {
        Self {
            urls: vec!["stun:stun.l.google.com:19302".to_owned()],
            username: None,
            credential: None,
        }
    }
}
