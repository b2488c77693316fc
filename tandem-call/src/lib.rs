pub mod config;
pub mod device;
pub mod error;
pub mod peer;
pub mod session;
pub mod signaling;

pub use config::{PeerConfig, SessionConfig};
pub use error::{CallError, SignalingError};
pub use session::{RoomHandle, RoomSession, RoomSnapshot, RoomState};
