mod connection;
mod peer_event;

pub use connection::PeerConnection;
pub use peer_event::PeerEvent;
