mod channel;
mod memory;
mod ws_channel;

pub use channel::SignalingChannel;
pub use memory::{MemoryChannel, MemoryRelay};
pub use ws_channel::WsChannel;
