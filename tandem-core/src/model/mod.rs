mod event;
mod room;
mod session;
mod signaling;

pub use event::{ClientEnvelope, ClientEvent, ServerEnvelope, ServerEvent};
pub use room::RoomName;
pub use session::SessionId;
pub use signaling::{HANGUP_WORD, IceServerConfig, SignalMessage};
