use crate::error::CallError;
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_local::TrackLocal;

/// Which media kinds the user currently wants to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaToggles {
    pub audio: bool,
    pub video: bool,
}

impl Default for MediaToggles {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

impl MediaToggles {
    pub fn audio_only() -> Self {
        Self {
            audio: true,
            video: false,
        }
    }

    /// True when both kinds are switched off, in which case a provider
    /// must yield no media at all.
    pub fn all_off(&self) -> bool {
        !self.audio && !self.video
    }
}

/// The user's capture choices: which devices, and which kinds are on.
#[derive(Debug, Clone, Default)]
pub struct DeviceSelection {
    pub audio_device: Option<String>,
    pub video_device: Option<String>,
    pub toggles: MediaToggles,
}

/// Local capture handed to a peer connection for one call attempt.
pub struct LocalMedia {
    pub tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl LocalMedia {
    pub fn has_kind(&self, kind: RTPCodecType) -> bool {
        self.tracks.iter().any(|t| t.kind() == kind)
    }
}

/// Source of local capture. Implementations sit outside the engine;
/// the session only asks for media when a call attempt starts and asks
/// for it again on the next attempt, so a provider honoring a changed
/// [`DeviceSelection`] simply yields the new media then.
#[async_trait]
pub trait DeviceProvider: Send + Sync {
    /// Current local media, or `None` when every kind is toggled off.
    async fn local_media(&self) -> Result<Option<LocalMedia>, CallError>;

    /// Stop capture. Called during call teardown.
    async fn release(&self);
}

/// Provider for endpoints that send nothing and only receive.
pub struct NullDevices;

#[async_trait]
impl DeviceProvider for NullDevices {
    async fn local_media(&self) -> Result<Option<LocalMedia>, CallError> {
        Ok(None)
    }

    async fn release(&self) {}
}
