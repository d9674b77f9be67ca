use bytes::Bytes;
use duelink_session::LocalMedia;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use webrtc::api::media_engine::MIME_TYPE_VP8;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// One sample-backed video track, as a stand-in for a real camera capture.
pub fn sample_video_media(stream_id: &str) -> (LocalMedia, Arc<TrackLocalStaticSample>) {
    let track = Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            ..Default::default()
        },
        "video".to_owned(),
        stream_id.to_owned(),
    ));
    let media = LocalMedia::none().with_track(track.clone());
    (media, track)
}

/// Pump dummy frames so the remote side sees RTP flowing. Writes before the
/// track is bound are silently dropped, so the writer can start early.
pub fn spawn_sample_writer(track: Arc<TrackLocalStaticSample>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(50));
        loop {
            ticker.tick().await;
            let _ = track
                .write_sample(&Sample {
                    data: Bytes::from_static(&[0u8; 32]),
                    duration: Duration::from_millis(50),
                    ..Default::default()
                })
                .await;
        }
    })
}
