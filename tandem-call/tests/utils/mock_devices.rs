use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use tandem_call::device::{DeviceProvider, LocalMedia};
use tandem_call::error::CallError;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Audio source that keeps a handle to its own track so a test can
/// pump samples through it once negotiation completes.
pub struct MockMediaSource {
    track: Arc<TrackLocalStaticSample>,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self {
            track: Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: "audio/opus".to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    ..Default::default()
                },
                "audio".to_owned(),
                "mock".to_owned(),
            )),
        }
    }

    /// Feed silence frames until the returned task is aborted or the
    /// duration runs out. Write errors are ignored; the track simply
    /// drops samples until it is bound to a live transport.
    pub fn pump_for(&self, duration: Duration) -> tokio::task::JoinHandle<()> {
        let track = self.track.clone();
        tokio::spawn(async move {
            let frame = Duration::from_millis(20);
            let deadline = tokio::time::Instant::now() + duration;
            while tokio::time::Instant::now() < deadline {
                let _ = track
                    .write_sample(&Sample {
                        data: vec![0u8; 64].into(),
                        duration: frame,
                        ..Default::default()
                    })
                    .await;
                tokio::time::sleep(frame).await;
            }
        })
    }
}

impl Default for MockMediaSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceProvider for MockMediaSource {
    async fn local_media(&self) -> Result<Option<LocalMedia>, CallError> {
        let track: Arc<dyn TrackLocal + Send + Sync> = self.track.clone();
        Ok(Some(LocalMedia {
            tracks: vec![track],
        }))
    }

    async fn release(&self) {}
}
