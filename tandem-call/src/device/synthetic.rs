use crate::device::provider::{DeviceProvider, DeviceSelection, LocalMedia, MediaToggles};
use crate::error::CallError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Device provider backed by static sample tracks instead of real
/// capture hardware. Good enough for tests and the demo client, where
/// what matters is that the peer connection has something to send.
pub struct SyntheticDevices {
    selection: Mutex<DeviceSelection>,
}

impl SyntheticDevices {
    pub fn new(toggles: MediaToggles) -> Self {
        Self {
            selection: Mutex::new(DeviceSelection {
                toggles,
                ..Default::default()
            }),
        }
    }

    pub fn with_selection(selection: DeviceSelection) -> Self {
        Self {
            selection: Mutex::new(selection),
        }
    }

    /// Swap the capture choices. The next call attempt picks them up.
    pub async fn set_selection(&self, selection: DeviceSelection) {
        *self.selection.lock().await = selection;
    }
}

#[async_trait]
impl DeviceProvider for SyntheticDevices {
    async fn local_media(&self) -> Result<Option<LocalMedia>, CallError> {
        let selection = self.selection.lock().await.clone();
        if selection.toggles.all_off() {
            return Ok(None);
        }

        let mut tracks: Vec<Arc<dyn TrackLocal + Send + Sync>> = Vec::new();

        if selection.toggles.audio {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: "audio/opus".to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    ..Default::default()
                },
                "audio".to_owned(),
                "tandem".to_owned(),
            )));
        }

        if selection.toggles.video {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: "video/VP8".to_owned(),
                    clock_rate: 90000,
                    ..Default::default()
                },
                "video".to_owned(),
                "tandem".to_owned(),
            )));
        }

        Ok(Some(LocalMedia { tracks }))
    }

    async fn release(&self) {}
}
