use crate::error::SignalingError;
use async_trait::async_trait;
use tandem_core::model::{ClientEvent, RoomName};

/// Outbound half of the relay link. A session is handed one of these
/// at spawn together with the matching `ServerEvent` receiver, which
/// carries the inbound half.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn send(&self, room: &RoomName, event: ClientEvent) -> Result<(), SignalingError>;
}
