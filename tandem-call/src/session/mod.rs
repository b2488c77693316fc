mod command;
mod handle;
mod room_session;
mod state;

pub use command::SessionCommand;
pub use handle::RoomHandle;
pub use room_session::RoomSession;
pub use state::{RoomSnapshot, RoomState, SessionNotice};
