//! Call-related error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("signaling channel closed")]
    Closed,

    #[error("failed to encode wire payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport failure: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("failed to set up peer connection: {0}")]
    PeerSetup(#[source] webrtc::Error),

    #[error("negotiation step failed: {0}")]
    Negotiation(#[source] webrtc::Error),

    #[error("local media unavailable: {0}")]
    Media(#[source] webrtc::Error),

    #[error("device acquisition failed: {0}")]
    Device(String),

    #[error("teardown failed: {0}")]
    Teardown(#[source] webrtc::Error),

    #[error(transparent)]
    Signaling(#[from] SignalingError),

    #[error("session is no longer running")]
    SessionClosed,
}
